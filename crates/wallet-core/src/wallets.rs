use wallet_adapter::{Chain, ChainFamily, Wallet};

/// The wallets offered in the selection dialog out of the box.
pub fn default_wallets() -> Vec<Wallet> {
    vec![
        Wallet::new("metamask", "MetaMask", "/wallets/metamask.svg", [ChainFamily::Evm]),
        Wallet::new(
            "walletconnect",
            "WalletConnect",
            "/wallets/walletconnect.svg",
            [ChainFamily::Evm],
        ),
        Wallet::new("phantom", "Phantom", "/wallets/phantom.svg", [ChainFamily::Solana]),
        Wallet::new("solflare", "Solflare", "/wallets/solflare.svg", [ChainFamily::Solana]),
    ]
}

/// Wallets that can connect to `chain`, in catalogue order.
pub fn filter_wallets_by_chain<'a>(wallets: &'a [Wallet], chain: &Chain) -> Vec<&'a Wallet> {
    wallets.iter().filter(|w| w.is_compatible(chain)).collect()
}
