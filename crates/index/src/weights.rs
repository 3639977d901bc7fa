/// How much a single token counts for, depending on the field it came from.
///
/// Keywords are curated by the author and count the most; title and
/// description follow; the author name and the rendered content count once
/// per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Weights {
    pub keywords: u64,
    pub description: u64,
    pub title: u64,
    pub author: u64,
    pub content: u64,
}
impl Default for Weights {
    fn default() -> Self {
        Self {
            keywords: 10,
            description: 5,
            title: 5,
            author: 1,
            content: 1,
        }
    }
}
