//! Juno Cash networks and their human-readable prefixes.

use core::fmt;

/// Network a viewing key and its addresses belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet network
    Mainnet,
    /// Testnet network
    Testnet,
    /// Regtest network (for local testing)
    Regtest,
}

impl Network {
    /// Every supported network.
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Regtest];

    /// HRP of unified full viewing keys on this network.
    pub fn ufvk_hrp(self) -> &'static str {
        match self {
            Network::Mainnet => "jview",
            Network::Testnet => "jviewtest",
            Network::Regtest => "jviewregtest",
        }
    }

    /// HRP of unified payment addresses on this network.
    pub fn address_hrp(self) -> &'static str {
        match self {
            Network::Mainnet => "j",
            Network::Testnet => "jtest",
            Network::Regtest => "jregtest",
        }
    }

    /// Network whose viewing-key HRP is `hrp`, if any.
    pub fn from_ufvk_hrp(hrp: &str) -> Option<Network> {
        Network::ALL.into_iter().find(|n| n.ufvk_hrp() == hrp)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hrp_families_are_disjoint() {
        for a in Network::ALL {
            assert_eq!(Network::from_ufvk_hrp(a.ufvk_hrp()), Some(a));
            for b in Network::ALL {
                assert_ne!(a.ufvk_hrp(), b.address_hrp());
            }
        }
        assert_eq!(Network::from_ufvk_hrp("j"), None);
        assert_eq!(Network::from_ufvk_hrp("uview"), None);
    }

    #[test]
    fn test_hrps_fit_container_padding() {
        for n in Network::ALL {
            assert!(n.ufvk_hrp().len() <= crate::zip316::PADDING_LEN);
            assert!(n.address_hrp().len() <= crate::zip316::PADDING_LEN);
        }
    }
}
