/// Domain-separated BLAKE3 hasher.
///
/// The domain tag is prepended to every computation so that two hash
/// families fed the same bytes never collide. Verso uses one family to key
/// buckets by path and a plain BLAKE3 digest for content integrity; the two
/// are never interchangeable.
pub struct DomainHasher {
    domain: &'static str,
}

impl DomainHasher {
    /// Hasher for path strings (bucket keys).
    pub const PATH: Self = Self {
        domain: "verso-path-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Raw BLAKE3 hash without domain separation.
    pub fn raw_hash(data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
