/// NoGroupVersion is for test
/// +kubetype-gen
pub struct NoGroupVersion {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version/version
pub struct InvalidGroupVersion {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=groupversion
pub struct EmptyGroup {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
pub struct AGoodType {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
/// +kubetype-gen:kubeType=AGoodType
pub struct DuplicateKubeType {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
/// +kubetype-gen:kubeType
pub struct EmptyKubeType {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group2.name.io/version
pub struct OverlappingPackageGroupType1 {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group2/version
pub struct OverlappingPackageGroupType2 {
    pub field: String,
}
