//! Address-or-username resolution to canonical cache keys.

use crate::types::reserved_name;

/// Address syntax and canonicalization, supplied by the embedding
/// application's chain SDK. The cache never derives addresses itself.
pub trait AddressCodec: Send + Sync {
    /// Whether the input is a syntactically valid chain address.
    fn is_valid_address(&self, input: &str) -> bool;

    /// The chain-canonical form of a valid address, used as the primary
    /// cache key. Returns `None` for invalid input.
    fn canonicalize(&self, input: &str) -> Option<String>;
}

/// Codec for 0x-prefixed, 40-hex-digit addresses. Canonical form is
/// lowercase. The default codec for the CLI and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexAddressCodec;

impl AddressCodec for HexAddressCodec {
    fn is_valid_address(&self, input: &str) -> bool {
        let Some(hex) = input.strip_prefix("0x") else {
            return false;
        };
        hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn canonicalize(&self, input: &str) -> Option<String> {
        self.is_valid_address(input)
            .then(|| input.to_ascii_lowercase())
    }
}

/// Outcome of resolving an address-or-username input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A reserved pseudo-account; excluded from fetch and merge logic.
    Reserved(&'static str),
    /// The canonical cache key.
    Key(String),
    /// An unknown username. Not an error: downstream logic treats the
    /// account as not yet cached.
    Unresolved,
}

/// Resolve an address-or-username to a canonical key.
///
/// Pure function of the supplied alias lookup: reserved names pass through,
/// valid addresses canonicalize without touching the cache, and anything
/// else is treated as a username against the alias table.
pub(crate) fn resolve_with(
    codec: &dyn AddressCodec,
    alias_lookup: impl FnOnce(&str) -> Option<String>,
    input: &str,
) -> Resolved {
    if let Some(name) = reserved_name(input) {
        return Resolved::Reserved(name);
    }

    if let Some(canonical) = codec.canonicalize(input) {
        return Resolved::Key(canonical);
    }

    match alias_lookup(input) {
        Some(key) => Resolved::Key(key),
        None => Resolved::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const ADDR: &str = "0x00112233445566778899AabbCcdDeeFf00112233";

    #[test_case(ADDR, true ; "mixed case address")]
    #[test_case("0x0011223344556677889900112233445566778899", true ; "lowercase address")]
    #[test_case("0x1234", false ; "too short")]
    #[test_case("0x00112233445566778899001122334455667788zz", false ; "non hex digits")]
    #[test_case("0011223344556677889900112233445566778899", false ; "missing prefix")]
    #[test_case("alice", false ; "username")]
    #[test_case("", false ; "empty")]
    fn hex_codec_validity(input: &str, valid: bool) {
        assert_eq!(HexAddressCodec.is_valid_address(input), valid);
    }

    #[test]
    fn hex_codec_canonicalizes_to_lowercase() {
        let codec = HexAddressCodec;
        assert_eq!(codec.canonicalize(ADDR), Some(ADDR.to_ascii_lowercase()));
        assert_eq!(codec.canonicalize("alice"), None);
    }

    #[test]
    fn reserved_names_resolve_to_themselves() {
        let resolved = resolve_with(&HexAddressCodec, |_| None, "Mint");
        assert_eq!(resolved, Resolved::Reserved("Mint"));
    }

    #[test]
    fn valid_address_never_consults_aliases() {
        let resolved = resolve_with(
            &HexAddressCodec,
            |_| panic!("alias table must not be consulted for addresses"),
            ADDR,
        );
        assert_eq!(resolved, Resolved::Key(ADDR.to_ascii_lowercase()));
    }

    #[test]
    fn usernames_go_through_the_alias_table() {
        let resolved = resolve_with(
            &HexAddressCodec,
            |name| (name == "alice").then(|| "0xkey".to_string()),
            "alice",
        );
        assert_eq!(resolved, Resolved::Key("0xkey".to_string()));

        let resolved = resolve_with(&HexAddressCodec, |_| None, "bob");
        assert_eq!(resolved, Resolved::Unresolved);
    }
}
