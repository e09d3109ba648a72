//! Wires configuration, the GitHub forge and the npm installer into a single
//! reconciliation run.
use log::*;

use crate::{
    Result,
    cli::Args,
    config::Config,
    diff::{
        DiffEngine,
        installer::{Installer, NpmInstaller},
    },
    forge::{
        config::RemoteConfig,
        github::Github,
        manager::{ForgeManager, ForgeOptions},
        traits::Forge,
    },
    reconciler::{Outcome, Reconciler, Templates},
};

/// Reconcile the pre-release PR for the package named in `args`.
pub async fn execute(args: &Args) -> Result<Outcome> {
    let (config, remote) = resolve(args)?;

    info!(
        "reconciling pre-release PR for {} in {}",
        args.name, remote.path
    );

    let forge = Github::new(remote)?;
    let installer = NpmInstaller::new(config.npm.clone());

    let reconciler =
        build_reconciler(args, &config, Box::new(forge), Box::new(installer))?;

    let outcome = reconciler.reconcile(&args.name, &args.folder()).await?;

    report(&args.name, &outcome);

    Ok(outcome)
}

/// Load the config file and resolve the remote. Fails before any network
/// call when the token or repository is missing.
pub fn resolve(args: &Args) -> Result<(Config, RemoteConfig)> {
    let config = Config::load(&args.config)?;
    let remote = args.get_remote(&config)?;
    Ok((config, remote))
}

pub fn build_reconciler(
    args: &Args,
    config: &Config,
    forge: Box<dyn Forge>,
    installer: Box<dyn Installer>,
) -> Result<Reconciler> {
    let manager = ForgeManager::new(
        forge,
        ForgeOptions {
            dry_run: args.dry_run,
        },
    );

    if manager.dry_run() {
        warn!("dry_run: no branches, commits or pull requests will be changed");
    }

    let diff_engine =
        DiffEngine::new(&args.repo_root, config.packages_dir.clone(), installer);

    let templates = Templates::new(
        config.title_template.clone(),
        config.body_template.clone(),
    );

    Reconciler::builder()
        .forge(manager)
        .diff_engine(diff_engine)
        .templates(templates)
        .base_branch(config.base_branch.clone())
        .build()
}

fn report(name: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Nothing => info!("{name}: nothing to release"),
        Outcome::Closed(pr) => info!("{name}: closed PR #{}", pr.number),
        Outcome::Created(pr) => {
            info!("{name}: opened PR #{}: {}", pr.number, pr.title)
        }
        Outcome::UpToDate(pr) => {
            info!("{name}: PR #{} is up to date", pr.number)
        }
        Outcome::Rebased(pr) => {
            info!("{name}: rebased PR #{}: {}", pr.number, pr.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        PrereleaseError,
        forge::traits::MockForge,
        test_helpers::{installer_with_files, write_files},
    };

    #[test]
    fn resolve_fails_without_token() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("prerelease.toml");
        fs::write(&config, "repo = \"https://github.com/acme/sdks\"\n")
            .unwrap();

        let args = Args::parse_from([
            "prerelease-pr",
            "--config",
            config.to_str().unwrap(),
        ]);

        let err = temp_env::with_var_unset("GITHUB_TOKEN", || resolve(&args))
            .unwrap_err();

        assert!(matches!(err, PrereleaseError::Configuration(_)));
    }

    #[test]
    fn resolve_reads_config_file() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("prerelease.toml");
        fs::write(
            &config,
            "repo = \"https://github.com/acme/sdks\"\ntoken = \"t\"\npackages_dir = \"libs\"\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "prerelease-pr",
            "--config",
            config.to_str().unwrap(),
        ]);

        let (config, remote) = resolve(&args).unwrap();

        assert_eq!(config.packages_dir, "libs");
        assert_eq!(remote.path, "acme/sdks");
    }

    #[tokio::test]
    async fn built_reconciler_uses_configured_packages_dir() {
        let repo = TempDir::new().unwrap();
        let files = [
            ("package.json", r#"{"name":"@acme/client","version":"0.3.0"}"#),
            ("index.js", "export {};\n"),
        ];
        write_files(&repo.path().join("libs/client"), &files);

        let args = Args::parse_from([
            "prerelease-pr",
            "@acme/client",
            "--repo-root",
            repo.path().to_str().unwrap(),
        ]);
        let config = Config {
            packages_dir: "libs".into(),
            ..Config::default()
        };

        let mut forge = MockForge::new();
        forge
            .expect_find_open_prs()
            .withf(|prefix| prefix == "release-acme/client-")
            .times(1)
            .returning(|_| Ok(vec![]));

        let reconciler = build_reconciler(
            &args,
            &config,
            Box::new(forge),
            Box::new(installer_with_files("@acme/client", &files)),
        )
        .unwrap();

        let outcome = reconciler
            .reconcile(&args.name, &args.folder())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Nothing);
    }
}
