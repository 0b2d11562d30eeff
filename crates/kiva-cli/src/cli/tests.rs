#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_dev_overrides() {
        let cli = Cli::parse_from([
            "kiva",
            "dev",
            "--port",
            "9000",
            "--fixtures",
            "fixtures/api.json",
            "--proxy-target",
            "http://127.0.0.1:3000",
        ]);

        match cli.command {
            Command::Dev(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.fixtures, Some(PathBuf::from("fixtures/api.json")));
                assert_eq!(args.proxy_target.as_deref(), Some("http://127.0.0.1:3000"));
                assert!(args.content_base.is_none());
            }
            other => panic!("expected dev, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_chunk_defaults() {
        let cli = Cli::parse_from(["kiva", "chunk", "node_modules/react/index.js"]);
        match cli.command {
            Command::Chunk(args) => {
                assert_eq!(args.resources, ["node_modules/react/index.js"]);
                assert_eq!(args.chunks, 1);
                assert_eq!(args.size, 0);
            }
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn test_chunk_requires_resource() {
        assert!(Cli::try_parse_from(["kiva", "chunk"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiva", "config", "--mode", "production", "--cwd", "app", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.globals().cwd, Some(PathBuf::from("app")));
        match cli.command {
            Command::Config(args) => assert_eq!(args.mode.as_deref(), Some("production")),
            other => panic!("expected config, got {other:?}"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kiva", "-v", "-q", "budget"]).is_err());
    }
}
