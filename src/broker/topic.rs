use std::fmt;

/// Unique identifier for a subscriber, handed out by the broker's
/// monotonic counter.
pub type SubscriberId = u64;

/// A hierarchical topic path: an ordered sequence of non-empty segments.
///
/// Construction canonicalizes its input: any '/' characters embedded in a
/// segment are dropped, empty segments are discarded, and a path with no
/// segments left is invalid. The canonical string form is the segments
/// joined by '/'.
///
/// Routing is hierarchical: a message published to `a/b/c` reaches the
/// subscribers of `a`, `a/b`, and `a/b/c` (see [`TopicPath::sub_paths`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPath {
    segments: Vec<String>,
}

impl TopicPath {
    /// Canonicalizes `segments` into a path. Returns `None` when nothing
    /// survives cleaning.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coapsub::broker::topic::TopicPath;
    /// let path = TopicPath::from_segments(["root", "", "no/de"].map(String::from)).unwrap();
    /// assert_eq!(path.as_canonical(), "root/node");
    /// ```
    pub fn from_segments(segments: impl IntoIterator<Item = String>) -> Option<Self> {
        let cleaned: Vec<String> = segments
            .into_iter()
            .map(|s| s.replace('/', ""))
            .filter(|s| !s.is_empty())
            .collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self { segments: cleaned })
        }
    }

    /// Parses a '/'-joined path string.
    pub fn parse(path: &str) -> Option<Self> {
        Self::from_segments(path.split('/').map(String::from))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The canonical string key used by the broker's maps.
    pub fn as_canonical(&self) -> String {
        self.segments.join("/")
    }

    /// The left-to-right non-empty prefixes of this path, shortest first:
    /// `a/b/c` expands to `a`, `a/b`, `a/b/c`.
    pub fn sub_paths(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.segments.len());
        let mut acc = String::new();
        for segment in &self.segments {
            if !acc.is_empty() {
                acc.push('/');
            }
            acc.push_str(segment);
            out.push(acc.clone());
        }
        out
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_canonical())
    }
}
