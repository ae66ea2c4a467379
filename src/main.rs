use std::path::Path;

use envconfig::Envconfig;

use news2mqtt::config::Config;
use news2mqtt::mqtt::topics::{DeviceIdentity, Topics};
use news2mqtt::mqtt_service::MqttService;
use news2mqtt::print_job::PrintScript;

#[derive(Envconfig)]
struct Settings {
    /// Directory holding `config.toml` (or `config.local.toml`).
    #[envconfig(from = "CONFIG_DIR", default = ".")]
    pub config_dir: String,

    /// Shell command running the feed collector/printer script.
    #[envconfig(from = "PRINT_SCRIPT", default = "./print_news.sh")]
    pub print_script: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = Settings::init_from_env().unwrap();

    // Missing or mis-typed broker settings are fatal; no connection is
    // attempted before a valid config exists.
    let config = match Config::load(Path::new(&settings.config_dir)) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let topics = Topics::new(DeviceIdentity::default());
    let script = PrintScript::new(settings.print_script);

    MqttService::new(config.mqtt, topics, script).run().await;

    Ok(())
}
