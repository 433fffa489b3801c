use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = cvmbot_frame::encode(&args.fields);
    print_frame(&frame, &args.fields, format);
    Ok(SUCCESS)
}
