use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("tcptun {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: tcptun");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("TCPTUN_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("TCPTUN_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("wire_format: u16-be length prefix, max packet 65535 bytes");
    println!(
        "features: async={}, cli=true, tun={}",
        cfg!(feature = "async"),
        cfg!(target_os = "linux")
    );

    Ok(SUCCESS)
}
