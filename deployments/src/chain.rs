//! The L1/L2 network pairs the protocol is deployed on

/// A network of a chain pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    /// The chain id
    pub id: u64,
    /// The name of the network
    pub name: &'static str,
}

/// An L1 network and the L2 network settling on it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainPair {
    /// The L1 network
    pub l1: Chain,
    /// The L2 network
    pub l2: Chain,
}

/// Every supported chain pair
pub const CHAIN_LIST: [ChainPair; 4] = [
    ChainPair {
        l1: Chain { id: 1, name: "mainnet" },
        l2: Chain { id: 42161, name: "arbitrum-one" },
    },
    ChainPair {
        l1: Chain { id: 4, name: "rinkeby" },
        l2: Chain { id: 421611, name: "arbitrum-rinkeby" },
    },
    ChainPair {
        l1: Chain { id: 5, name: "goerli" },
        l2: Chain { id: 421613, name: "arbitrum-goerli" },
    },
    ChainPair {
        l1: Chain { id: 1337, name: "localnitrol1" },
        l2: Chain { id: 412346, name: "localnitrol2" },
    },
];

/// Whether the chain id is a supported L1
pub fn is_l1(chain_id: u64) -> bool {
    CHAIN_LIST.iter().any(|pair| pair.l1.id == chain_id)
}

/// Whether the chain id is a supported L2
pub fn is_l2(chain_id: u64) -> bool {
    CHAIN_LIST.iter().any(|pair| pair.l2.id == chain_id)
}

/// The L2 paired with an L1, `None` if the id is not a supported L1
pub fn l1_to_l2(chain_id: u64) -> Option<u64> {
    CHAIN_LIST
        .iter()
        .find(|pair| pair.l1.id == chain_id)
        .map(|pair| pair.l2.id)
}

/// The L1 paired with an L2, `None` if the id is not a supported L2
pub fn l2_to_l1(chain_id: u64) -> Option<u64> {
    CHAIN_LIST
        .iter()
        .find(|pair| pair.l2.id == chain_id)
        .map(|pair| pair.l1.id)
}

/// The other network of the chain's pair
pub fn counterpart(chain_id: u64) -> Option<u64> {
    l1_to_l2(chain_id).or_else(|| l2_to_l1(chain_id))
}

/// The name of a supported network
pub fn chain_name(chain_id: u64) -> Option<&'static str> {
    CHAIN_LIST
        .iter()
        .flat_map(|pair| [pair.l1, pair.l2])
        .find(|chain| chain.id == chain_id)
        .map(|chain| chain.name)
}
