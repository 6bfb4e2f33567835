/// ----- CONFIGURATION MODULE -----
/// Loads the shared configuration file and narrows it into the typed
/// configuration each process kind needs. Built once at startup and passed
/// down; any missing file, missing key or out-of-range value is fatal and
/// makes the process exit non-zero.
use std::collections::HashMap;
use std::env;
use std::fs;
use std::time::Duration;

use thiserror::Error;

const CONFIG_PATH: &str = "config.json";
const FALLBACK_CONFIG_PATH: &str = "../config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub network: HashMap<String, Vec<u16>>,
    pub building: HashMap<String, u8>,
    pub timing_ms: HashMap<String, u64>,
    pub simulation: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing configuration key {0:?}")]
    MissingKey(&'static str),
    #[error("configuration key {key:?} lists {have} ports but {need} are needed")]
    NotEnoughPorts {
        key: &'static str,
        need: usize,
        have: usize,
    },
    #[error("id {id} is out of range, only {count} configured")]
    IdOutOfRange { id: u8, count: u8 },
}

fn read_config_file() -> Result<ConfigFile, ConfigError> {
    let contents = match fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => contents,
        Err(_) => fs::read_to_string(FALLBACK_CONFIG_PATH)?,
    };
    Ok(serde_json::from_str(&contents)?)
}

/// Parses a `--id N` pair from the program arguments, defaulting to 0 and
/// skipping anything it does not recognize.
pub fn parse_id_arg() -> u8 {
    let mut id = 0;
    let args: Vec<String> = env::args().collect();
    for arg_pair in args.rchunks_exact(2) {
        if arg_pair[0].as_str() == "--id" {
            id = match arg_pair[1].parse::<u8>() {
                Ok(id) => id,
                Err(_) => {
                    println!("id {} is not a number, skipping...", arg_pair[1]);
                    id
                }
            };
        }
    }
    id
}

impl ConfigFile {
    fn ports(&self, key: &'static str) -> Result<&Vec<u16>, ConfigError> {
        self.network.get(key).ok_or(ConfigError::MissingKey(key))
    }

    fn port_for(&self, key: &'static str, id: u8) -> Result<u16, ConfigError> {
        let ports = self.ports(key)?;
        ports
            .get(id as usize)
            .copied()
            .ok_or(ConfigError::NotEnoughPorts {
                key,
                need: id as usize + 1,
                have: ports.len(),
            })
    }

    fn building_value(&self, key: &'static str) -> Result<u8, ConfigError> {
        self.building
            .get(key)
            .copied()
            .ok_or(ConfigError::MissingKey(key))
    }

    fn timing_value(&self, key: &'static str) -> Result<Duration, ConfigError> {
        self.timing_ms
            .get(key)
            .copied()
            .map(Duration::from_millis)
            .ok_or(ConfigError::MissingKey(key))
    }

    fn building(&self) -> Result<Building, ConfigError> {
        Ok(Building {
            num_cars: self.building_value("num_cars")?,
            num_floors: self.building_value("num_floors")?,
        })
    }

    fn timing(&self) -> Result<Timing, ConfigError> {
        Ok(Timing {
            travel_time: self.timing_value("travel_time")?,
            door_time: self.timing_value("door_open_time")?,
            reply_slack: self.timing_value("reply_slack")?,
        })
    }

    fn dispatcher_port(&self) -> Result<u16, ConfigError> {
        self.port_for("dispatcher_ports", 0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Building {
    pub num_cars: u8,
    pub num_floors: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub travel_time: Duration,
    pub door_time: Duration,
    pub reply_slack: Duration,
}

impl Timing {
    /// Bound on the wait for a car's reply to one command: per-floor travel
    /// time times the floors to cover, plus the door time, plus slack.
    pub fn reply_budget(&self, floors: u8) -> Duration {
        self.travel_time * u32::from(floors.max(1)) + self.door_time + self.reply_slack
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub port: u16,
    pub car_ports: Vec<u16>,
    pub floor_ports: Vec<u16>,
    pub building: Building,
    pub timing: Timing,
}

impl DispatcherConfig {
    pub fn get() -> Result<Self, ConfigError> {
        Self::from_file(&read_config_file()?)
    }

    pub fn from_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let building = file.building()?;
        let car_ports = file.ports("car_ports")?.clone();
        if car_ports.len() < building.num_cars as usize {
            return Err(ConfigError::NotEnoughPorts {
                key: "car_ports",
                need: building.num_cars as usize,
                have: car_ports.len(),
            });
        }
        let floor_ports = file.ports("floor_ports")?.clone();
        if floor_ports.len() < building.num_floors as usize {
            return Err(ConfigError::NotEnoughPorts {
                key: "floor_ports",
                need: building.num_floors as usize,
                have: floor_ports.len(),
            });
        }
        Ok(DispatcherConfig {
            port: file.dispatcher_port()?,
            car_ports,
            floor_ports,
            building,
            timing: file.timing()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CarConfig {
    pub id: u8,
    pub port: u16,
    pub dispatcher_port: u16,
    pub building: Building,
    pub timing: Timing,
}

impl CarConfig {
    pub fn get() -> Result<Self, ConfigError> {
        Self::from_file(&read_config_file()?, parse_id_arg())
    }

    pub fn from_file(file: &ConfigFile, id: u8) -> Result<Self, ConfigError> {
        let building = file.building()?;
        if id >= building.num_cars {
            return Err(ConfigError::IdOutOfRange {
                id,
                count: building.num_cars,
            });
        }
        Ok(CarConfig {
            id,
            port: file.port_for("car_ports", id)?,
            dispatcher_port: file.dispatcher_port()?,
            building,
            timing: file.timing()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FloorConfig {
    pub id: u8,
    pub port: u16,
    pub dispatcher_port: u16,
    pub building: Building,
    pub events_file: String,
}

impl FloorConfig {
    pub fn get() -> Result<Self, ConfigError> {
        Self::from_file(&read_config_file()?, parse_id_arg())
    }

    pub fn from_file(file: &ConfigFile, id: u8) -> Result<Self, ConfigError> {
        let building = file.building()?;
        if id >= building.num_floors {
            return Err(ConfigError::IdOutOfRange {
                id,
                count: building.num_floors,
            });
        }
        Ok(FloorConfig {
            id,
            port: file.port_for("floor_ports", id)?,
            dispatcher_port: file.dispatcher_port()?,
            building,
            events_file: file
                .simulation
                .get("events_file")
                .cloned()
                .ok_or(ConfigError::MissingKey("events_file"))?,
        })
    }
}
