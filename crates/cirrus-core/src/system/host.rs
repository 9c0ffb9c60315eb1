use std::env;

use anyhow::{bail, Result};
use cirrus_domain::{api::Binary, arch};

use crate::effects::Host;

pub struct SystemHost {
    cli: Binary,
}

impl SystemHost {
    #[must_use]
    pub fn new(cli: Binary) -> Self {
        Self { cli }
    }

    /// Catalog name of the running machine's architecture.
    #[must_use]
    pub fn arch(&self) -> String {
        arch::normalise(env::consts::ARCH)
    }
}

impl Host for SystemHost {
    fn host_arch(&self) -> Result<String> {
        let arch = self.arch();
        if !arch::is_known(&arch) {
            bail!("unsupported host architecture {:?}", env::consts::ARCH);
        }
        Ok(arch)
    }

    fn cli_version(&self) -> Binary {
        self.cli.clone()
    }
}
