use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ConfigOption {
    pub name: &'static str,
    pub option_type: OptionType,
}

#[derive(Debug, Clone)]
pub enum OptionType {
    Spin { min: i32, max: i32 },
    Check,
}

impl OptionType {
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            OptionType::Spin { min, max } => {
                let parsed = value
                    .parse::<i32>()
                    .map_err(|e| format!("Invalid integer: {}", e))?;
                if parsed < *min || parsed > *max {
                    return Err(format!("Value {} out of range [{}, {}]", parsed, min, max));
                }
                Ok(())
            }
            OptionType::Check => match value {
                "true" | "false" => Ok(()),
                _ => Err("Boolean value must be 'true' or 'false'".to_string()),
            },
        }
    }

    pub fn describe<T>(&self, name: &str, current_value: &T) -> String
    where
        T: ToString,
    {
        match self {
            OptionType::Spin { min, max } => format!(
                "option name {} type spin default {} min {} max {}",
                name,
                current_value.to_string(),
                min,
                max
            ),
            OptionType::Check => format!(
                "option name {} type check default {}",
                name,
                current_value.to_string()
            ),
        }
    }
}

fn option(include: bool, name: &'static str, option_type: OptionType) -> Option<ConfigOption> {
    if include {
        Some(ConfigOption { name, option_type })
    } else {
        None
    }
}

macro_rules! define_config {
    ($(($field:ident: $type:ty, $name:expr, $option_type:expr, $default:expr, $include:expr)),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub struct EngineConfig {
            $(pub $field: ConfigParam<$type>,)*
        }

        impl Default for EngineConfig {
            fn default() -> Self {
                Self {
                    $($field: ConfigParam {
                        value: $default,
                        option: option($include, $name, $option_type),
                    },)*
                }
            }
        }

        impl EngineConfig {
            pub fn update_from_option(&mut self, name: &str, value: &str) -> Result<(), String> {
                match name {
                    $($name if $include => self.$field.update_from_option(value),)*
                    _ => Err(format!("Unknown parameter: {}", name)),
                }
            }

            /// One line per exposed option.
            pub fn describe(&self) -> Vec<String> {
                let mut lines = Vec::new();
                $(
                    if let Some(line) = self.$field.describe() {
                        lines.push(line);
                    }
                )*
                lines
            }
        }
    };
}

define_config!(
    // Standard parameters
    (hash_bits: u32, "Hash Bits", OptionType::Spin { min: 10, max: 28 }, 20, true), // log2 of entries per table
    (max_depth: u8, "Max Depth", OptionType::Spin { min: 1, max: 60 }, 12, true), // Midgame iterative deepening limit
    (endgame_empties: u8, "Endgame Empties", OptionType::Spin { min: 0, max: 60 }, 18, true), // Solve exactly at or below this
    (time_limit_ms: u32, "Time Limit", OptionType::Spin { min: 0, max: 3_600_000 }, 0, true), // 0 = no deadline
    (use_hash: bool, "Use Hash", OptionType::Check, true, true),
    (use_mpc: bool, "Use MPC", OptionType::Check, true, true),
    (eval_min: i32, "Eval Min", OptionType::Spin { min: -64, max: 0 }, -64, true), // Evaluator clamp range
    (eval_max: i32, "Eval Max", OptionType::Spin { min: 0, max: 64 }, 64, true),

    // Search regimes - below these depths the unordered search takes over
    (ordering_depth: u8, "Ordering Depth", OptionType::Spin { min: 1, max: 10 }, 3, cfg!(feature = "tuning")),
    (endgame_ordering_empties: u8, "Endgame Ordering Empties", OptionType::Spin { min: 2, max: 16 }, 7, cfg!(feature = "tuning")),

    // Move ordering
    (lookahead_depth: u8, "Lookahead Depth", OptionType::Spin { min: 0, max: 6 }, 2, cfg!(feature = "tuning")), // Max depth of the shallow probe per move
    (mobility_weight: i32, "Mobility Weight", OptionType::Spin { min: 0, max: 256 }, 16, cfg!(feature = "tuning")), // Per opponent reply
    (corner_mobility_weight: i32, "Corner Mobility Weight", OptionType::Spin { min: 0, max: 256 }, 48, cfg!(feature = "tuning")), // Per opponent corner reply

    // Multi-ProbCut
    (mpc_min_depth: u8, "MPC Min Depth", OptionType::Spin { min: 2, max: 30 }, 3, cfg!(feature = "tuning")),
    (mpc_max_depth: u8, "MPC Max Depth", OptionType::Spin { min: 2, max: 30 }, 20, cfg!(feature = "tuning")),
    (mpc_threshold: u32, "MPC Threshold", OptionType::Spin { min: 50, max: 400 }, 150, cfg!(feature = "tuning")), // Std multiplier x100
    (mpc_root_distance: u8, "MPC Root Distance", OptionType::Spin { min: 0, max: 10 }, 2, cfg!(feature = "tuning")), // Disabled this close to the root
    (mpc_max_nesting: u8, "MPC Max Nesting", OptionType::Spin { min: 0, max: 8 }, 2, cfg!(feature = "tuning")),
);

#[derive(Debug, Clone)]
pub struct ConfigParam<T> {
    pub value: T,
    pub option: Option<ConfigOption>,
}

impl<T> ConfigParam<T>
where
    T: FromStr + ToString + Clone,
    T::Err: std::fmt::Display,
{
    pub fn update_from_option(&mut self, value: &str) -> Result<(), String> {
        if let Some(meta) = &self.option {
            meta.option_type.validate(value)?;
        }

        let new_value = value
            .parse::<T>()
            .map_err(|e| format!("Parse error: {}", e))?;

        self.value = new_value;
        Ok(())
    }

    pub fn describe(&self) -> Option<String> {
        let meta = self.option.as_ref()?;
        Some(meta.option_type.describe(meta.name, &self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_option() {
        let mut config = EngineConfig::default();
        config.update_from_option("Max Depth", "8").unwrap();
        assert_eq!(config.max_depth.value, 8);

        config.update_from_option("Use MPC", "false").unwrap();
        assert!(!config.use_mpc.value);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut config = EngineConfig::default();
        assert!(config.update_from_option("Max Depth", "0").is_err());
        assert!(config.update_from_option("Max Depth", "deep").is_err());
        assert!(config.update_from_option("Use Hash", "yes").is_err());
        assert!(config.update_from_option("Nope", "1").is_err());
        assert_eq!(config.max_depth.value, 12);
    }

    #[test]
    fn test_describe_lists_standard_options() {
        let lines = EngineConfig::default().describe();
        assert!(lines
            .iter()
            .any(|l| l == "option name Max Depth type spin default 12 min 1 max 60"));
        assert!(lines
            .iter()
            .any(|l| l == "option name Use Hash type check default true"));
    }
}
