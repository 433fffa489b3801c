use crate::cmd::DecodeArgs;
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_elements, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let elements = cvmbot_frame::decode(args.frame.as_bytes());
    if elements.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("no elements could be decoded from {:?}", args.frame),
        ));
    }

    print_elements(&elements, format);
    Ok(SUCCESS)
}
