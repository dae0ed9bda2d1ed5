pub const CORE_MAINNET: u64 = 1116;
pub const CORE_TESTNET2: u64 = 1114;
pub const LOCALHOST: u64 = 31337;

/// A network known without any configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub url: &'static str,
    pub chain_id: u64,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "localhost",
        url: "http://127.0.0.1:8545",
        chain_id: LOCALHOST,
    },
    Preset {
        name: "core-testnet2",
        url: "https://rpc.test2.btcs.network",
        chain_id: CORE_TESTNET2,
    },
    Preset {
        name: "core-mainnet",
        url: "https://rpc.coredao.org",
        chain_id: CORE_MAINNET,
    },
];

pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}
