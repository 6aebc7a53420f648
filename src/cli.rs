use clap::Parser;
use remote_gamer::config::Config;
use remote_gamer::Role;
use std::path::PathBuf;

/// Play with a gamepad plugged into another machine.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// What this machine does in the relay
    #[arg(value_enum)]
    pub role: Role,

    /// Station address to dial (capture) or interface to listen on (emit)
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port shared by both ends
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Settings file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Physical pad to capture, by path or index
    #[arg(short, long)]
    pub device: Option<String>,

    /// Take exclusive access to the physical pad
    #[arg(long)]
    pub grab: bool,

    /// Turn debugging information on
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Command-line values win over the settings file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.network.host = host.clone();
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(device) = &self.device {
            config.capture.device = Some(device.clone());
        }
        if self.grab {
            config.capture.grab = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "remote-gamer",
            "controller",
            "--host",
            "192.168.1.9",
            "--port",
            "7000",
            "--device",
            "1",
        ]);
        assert_eq!(cli.role, Role::Capture);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.network.host, "192.168.1.9");
        assert_eq!(config.network.port, 7000);
        assert_eq!(config.capture.device.as_deref(), Some("1"));
        assert!(!config.capture.grab);
    }

    #[test]
    fn station_alias_selects_emit() {
        let cli = Cli::parse_from(["remote-gamer", "station"]);
        assert_eq!(cli.role, Role::Emit);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, Config::default());
    }
}
