use cvmbot_session::{DEFAULT_ORIGIN, SUBPROTOCOL};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cvmbot {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cvmbot");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CVMBOT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CVMBOT_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("subprotocol: {SUBPROTOCOL}");
    println!("default_origin: {DEFAULT_ORIGIN}");

    Ok(SUCCESS)
}
