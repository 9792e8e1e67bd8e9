use agent_relay::config::ConfigLoader;
use agent_relay::tooling::cli::{Cli, CliContext};
use clap::Parser;
use serde_json::Value;
use std::io::Write;

#[tokio::test]
async fn test_config_file_drives_cli_routing() {
    let contexts = tempfile::tempdir().unwrap();
    std::fs::write(
        contexts.path().join("vault.toml"),
        "id = \"vault\"\nname = \"Vault\"\ntype = \"storage\"\nauthRequired = true\n",
    )
    .unwrap();

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        "[contexts]\ndirectory = {:?}\n\n[routing.grants]\nnft-agent = [\"vault\"]\n",
        contexts.path().display().to_string()
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    let ctx = CliContext::new(config, None).unwrap();
    assert_eq!(ctx.router().len(), 1);

    let cli = Cli::try_parse_from([
        "relay", "route", "--agent", "nft-agent", "--context", "vault",
    ])
    .unwrap();
    let output = ctx.execute(&cli.command).await.unwrap();
    let routed: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(routed["contextId"], "vault");

    let cli = Cli::try_parse_from([
        "relay", "route", "--agent", "swap-agent", "--context", "vault",
    ])
    .unwrap();
    assert!(ctx.execute(&cli.command).await.is_err());
}
