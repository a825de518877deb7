//! Command line arguments and the game configuration file.

use clap::Parser;
use log::info;
use model::{Game, GameError, Map, DEFAULT_DOG_SPEED};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Game server command line.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Tick period in milliseconds. Starts the background ticker and
    /// disables the manual tick endpoint.
    #[arg(short = 't', long, value_name = "milliseconds", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_period: Option<u64>,
    /// Game configuration file (JSON)
    #[arg(short = 'c', long, value_name = "file")]
    pub config_file: PathBuf,
    /// Root directory of the static files
    #[arg(short = 'w', long, value_name = "dir")]
    pub www_root: PathBuf,
    /// Spawn dogs at random points on random roads
    #[arg(long)]
    pub randomize_spawn_points: bool,
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,
}

impl Args {
    pub fn tick_period(&self) -> Option<Duration> {
        self.tick_period.map(Duration::from_millis)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Game(#[from] GameError),
}

fn default_dog_speed() -> f64 {
    DEFAULT_DOG_SPEED
}

/// Contents of the game configuration file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_dog_speed")]
    pub default_dog_speed: f64,
    pub maps: Vec<Map>,
}

impl GameConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Loads the configured maps into `game`, in file order.
    pub fn apply(self, game: &mut Game) -> Result<(), GameError> {
        game.set_default_dog_speed(self.default_dog_speed);
        for map in self.maps {
            game.add_map(map)?;
        }
        Ok(())
    }
}

/// Reads `path` and builds a game from it.
pub fn load_game(path: &Path) -> Result<Game, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = GameConfig::from_json(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut game = Game::new();
    config.apply(&mut game)?;
    info!("Loaded {} maps from {}", game.maps().len(), path.display());
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::MapId;

    const CONFIG: &str = r#"{
        "defaultDogSpeed": 3.0,
        "maps": [
            {
                "id": "map1",
                "name": "Map 1",
                "dogSpeed": 4.0,
                "roads": [{"x0": 0, "y0": 0, "x1": 40}, {"x0": 40, "y0": 0, "y1": 30}],
                "buildings": [{"x": 5, "y": 5, "w": 30, "h": 20}],
                "offices": [{"id": "o0", "x": 40, "y": 30, "offsetX": 5, "offsetY": 0}]
            },
            {
                "id": "town",
                "name": "Town",
                "roads": [{"x0": 0, "y0": 0, "x1": 10}],
                "buildings": [],
                "offices": []
            }
        ]
    }"#;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("config-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["server", "-t", "50", "-c", "game.json", "-w", "static"]);
        assert_eq!(args.tick_period(), Some(Duration::from_millis(50)));
        assert_eq!(args.config_file, PathBuf::from("game.json"));
        assert_eq!(args.www_root, PathBuf::from("static"));
        assert!(!args.randomize_spawn_points);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);

        let args = Args::parse_from([
            "server",
            "--config-file",
            "game.json",
            "--www-root",
            "static",
            "--randomize-spawn-points",
            "--port",
            "9000",
        ]);
        assert_eq!(args.tick_period(), None);
        assert!(args.randomize_spawn_points);
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn test_args_require_paths_and_positive_period() {
        assert!(Args::try_parse_from(["server", "-w", "static"]).is_err());
        assert!(Args::try_parse_from(["server", "-c", "game.json"]).is_err());
        assert!(Args::try_parse_from(["server", "-t", "0", "-c", "g", "-w", "s"]).is_err());
    }

    #[test]
    fn test_config_speeds_and_order() {
        let mut game = Game::new();
        GameConfig::from_json(CONFIG).unwrap().apply(&mut game).unwrap();

        let ids: Vec<&str> = game.maps().iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, vec!["map1", "town"]);
        assert_eq!(game.default_dog_speed(), 3.0);

        let map1 = game.map("map1").unwrap();
        let town = game.map("town").unwrap();
        assert_eq!(game.dog_speed(map1), 4.0);
        assert_eq!(game.dog_speed(town), 3.0);
    }

    #[test]
    fn test_default_speed_when_absent() {
        let config = GameConfig::from_json(r#"{"maps": []}"#).unwrap();
        assert_eq!(config.default_dog_speed, DEFAULT_DOG_SPEED);
    }

    #[test]
    fn test_duplicate_map_is_rejected() {
        let map = r#"{"id": "m", "name": "M", "roads": [], "buildings": [], "offices": []}"#;
        let text = format!(r#"{{"maps": [{}, {}]}}"#, map, map);

        let mut game = Game::new();
        let err = GameConfig::from_json(&text).unwrap().apply(&mut game).unwrap_err();
        assert_eq!(err, GameError::DuplicateMap(MapId::from("m")));
    }

    #[test]
    fn test_load_game_from_file() {
        let path = write_temp("ok", CONFIG);
        let game = load_game(&path).unwrap();
        assert_eq!(game.maps().len(), 2);
    }

    #[test]
    fn test_load_game_errors() {
        let missing = std::env::temp_dir().join("definitely-not-here.json");
        assert!(matches!(load_game(&missing), Err(ConfigError::Io { .. })));

        let path = write_temp("bad", "{\"maps\": [");
        assert!(matches!(load_game(&path), Err(ConfigError::Parse { .. })));

        let office = r#"{"id": "o", "x": 0, "y": 0, "offsetX": 0, "offsetY": 0}"#;
        let text = format!(
            r#"{{"maps": [{{"id": "m", "name": "M", "roads": [], "buildings": [], "offices": [{}, {}]}}]}}"#,
            office, office
        );
        let path = write_temp("office", &text);
        assert!(matches!(load_game(&path), Err(ConfigError::Parse { .. })));
    }
}
