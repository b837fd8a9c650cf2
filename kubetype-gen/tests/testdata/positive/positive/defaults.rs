//! +kubetype-gen:groupVersion=group3/version3

/// AllOverridden is for test
/// +kubetype-gen
/// +kubetype-gen:groupVersion=group2/version2
/// +kubetype-gen:package=success/defaults/override
pub struct AllOverridden {
    pub field: String,
}

/// Defaulted is for test
/// +kubetype-gen
pub struct Defaulted {
    #[serde(rename = "someField")]
    pub field: String,
}

/// NotGenerated is for test
pub struct NotGenerated {
    pub field: String,
}
