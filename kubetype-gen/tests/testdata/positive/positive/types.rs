/// Type1 is for test
/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
pub struct Type1 {
    pub field: String,
}

/// NameOverride is for test
/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
/// +kubetype-gen:kubeType=Type2
pub struct NameOverride {
    pub field: String,
}

/// MultipleNames is for test
/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
/// +kubetype-gen:kubeType=Type3
/// +kubetype-gen:kubeType=Type4
/// +kubetype-gen:Type4:tag=sometag=somevalue
pub struct MultipleNames {
    pub field: String,
}

/// ComplexGroupVersionKubeType is for test
/// +kubetype-gen
/// +kubetype-gen:groupVersion=group2.test.io/version
pub struct ComplexGroupVersionKubeType {
    pub field: String,
}

/// +kubetype-gen
/// +kubetype-gen:groupVersion=group/version
///
/// SecondCommentsKubeType is for test
pub struct SecondCommentsKubeType {
    pub field: String,
}
