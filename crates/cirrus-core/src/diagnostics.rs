pub mod commands {
    pub const METADATA_REFRESH: &str = "CR101";
    pub const METADATA_LIST: &str = "CR102";
    pub const METADATA_SEARCH: &str = "CR103";
    pub const METADATA_SAVE: &str = "CR104";
    pub const TOOLS_ENSURE: &str = "CR201";
    pub const GENERIC: &str = "CR000";
}

pub mod catalog {
    pub const SCOPE_UNDETERMINABLE: &str = "CR300";
    pub const REGION_LOOKUP: &str = "CR301";
    pub const SOURCE_UNAVAILABLE: &str = "CR302";
    pub const SOURCES_UNAVAILABLE: &str = "CR303";
    pub const RECORD_PERSIST: &str = "CR310";
    pub const PARTIAL_RECONCILE: &str = "CR311";
    pub const STORE_READ: &str = "CR320";
}

pub mod tools {
    pub const NO_MATCHING_TOOLS: &str = "CR400";
    pub const ARCH_UNSUPPORTED: &str = "CR401";
    pub const HOST_ARCH_INCOMPATIBLE: &str = "CR402";
    pub const BUILD_FAILED: &str = "CR403";
    pub const ENVIRONMENT: &str = "CR404";
    pub const UPLOAD_FAILED: &str = "CR405";
}
