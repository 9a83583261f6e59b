/// The published Limelight IP allow list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRanges {
    /// Hex SHA-256 of the comma-joined ranges; changes whenever the list does.
    pub id: String,
    pub ip_ranges: Vec<String>,
    pub version: u64,
}
