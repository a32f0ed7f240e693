use clap::Parser;
use proptest::prelude::*;
use serde_json::json;

use cri::cli::{Cli, Commands};
use cri::preset::{PartSettings, PresetPartDefinition};

fn definition(batch_size: u64, prefix: &str) -> PresetPartDefinition {
    named_definition("catalog", "products", batch_size, prefix)
}

fn named_definition(preset: &str, part: &str, batch_size: u64, prefix: &str) -> PresetPartDefinition {
    let mut settings = PartSettings::new();
    settings.insert("__currentPresetName".into(), json!(preset));
    settings.insert("__currentPartName".into(), json!(part));
    settings.insert("batchSize".into(), json!(batch_size));
    PresetPartDefinition::new(&settings, Some(prefix.to_string())).unwrap()
}

proptest! {
    #[test]
    fn offset_tracks_batches(batch_size in 1u64..10_000, steps in 0u64..200) {
        let mut cursor = definition(batch_size, "propprefix01");
        for _ in 0..steps {
            cursor.next_batch();
        }

        prop_assert_eq!(cursor.current_batch(), steps + 1);
        prop_assert_eq!(cursor.offset(), Some(steps * batch_size));
        prop_assert_eq!(cursor.log_prefix(), "propprefix01");
    }

    #[test]
    fn unbatched_cursor_never_gets_offset(steps in 0u64..50) {
        let mut cursor = definition(0, "propprefix01");
        for _ in 0..steps {
            cursor.next_batch();
        }

        let arguments = cursor.command_arguments();
        prop_assert_eq!(arguments.batch_size, None);
        prop_assert_eq!(arguments.offset, None);
        prop_assert_eq!(arguments.current_batch, steps + 1);
    }

    #[test]
    fn command_arguments_resume_the_cursor(
        batch_size in 1u64..500,
        steps in 0u64..50,
        prefix in "[A-Za-z0-9]{12}",
    ) {
        let mut cursor = definition(batch_size, &prefix);
        for _ in 0..steps {
            cursor.next_batch();
        }

        let arguments = cursor.command_arguments();
        let resumed = PresetPartDefinition::from_command_arguments(&arguments);
        prop_assert_eq!(&resumed, &cursor);

        let json = serde_json::to_string(&arguments).unwrap();
        let decoded: cri::preset::CommandArguments = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, arguments);
    }

    #[test]
    fn cli_flags_parse_back(
        batch_size in 1u64..500,
        steps in 0u64..20,
        preset in "-{0,2}[a-z][a-z0-9_-]{0,10}",
        part in "-{0,2}[a-z][a-z0-9_-]{0,10}",
        prefix in "-{0,2}[A-Za-z0-9][A-Za-z0-9-]{0,11}",
    ) {
        let mut cursor = named_definition(&preset, &part, batch_size, &prefix);
        for _ in 0..steps {
            cursor.next_batch();
        }
        let arguments = cursor.command_arguments();

        let mut argv = vec!["cri".to_string(), "import".to_string()];
        argv.extend(arguments.to_cli_args());
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };

        prop_assert_eq!(args.preset, preset);
        prop_assert_eq!(args.part, part);
        prop_assert_eq!(args.log_prefix.as_deref(), Some(prefix.as_str()));
        prop_assert_eq!(args.current_batch, steps + 1);
        prop_assert_eq!(args.batch_size, Some(batch_size));
        prop_assert_eq!(args.offset.unwrap_or(0), steps * batch_size);
    }
}
