use inferprobe_core::load_test_cases;

use super::super::args::ValidateArgs;
use super::base_config;
use crate::exit_codes::EXIT_SUCCESS;

/// Dry run: load the input with the configured shape and report what would be sent.
pub(crate) fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let mut cfg = match base_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(e.exit_code());
        }
    };
    args.shape.apply(&mut cfg);

    let loaded = cfg
        .validate_shape()
        .and_then(|_| load_test_cases(&args.input, &cfg.input_shape()));
    let cases = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(e.exit_code());
        }
    };

    let mut fields: Vec<&str> = Vec::new();
    for case in &cases {
        for key in case.payload.keys() {
            if !fields.contains(&key.as_str()) {
                fields.push(key);
            }
        }
    }

    println!(
        "{}: {} test cases, label field '{}', payload fields: {}",
        args.input.display(),
        cases.len(),
        cfg.label_field,
        fields.join(", ")
    );
    Ok(EXIT_SUCCESS)
}
