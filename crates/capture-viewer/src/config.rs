use std::{fs, io::Read, path::PathBuf};

use capture_presenter::{
    LiveCaptureOptions, SessionOptions, ShaderPipelineDesc, ShaderProgram, ShaderSource,
};
use serde::{Deserialize, Serialize};

use crate::utilities::{
    directories::config_dir,
    failure::{Failure, report_and_panic},
};

const FILE_NAME: &str = "capture-viewer.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: Target,
    pub shaders: Shaders,
    pub presenter: Presenter,
}

/// What to capture.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Target {
    #[default]
    PrimaryMonitor,

    /// A monitor by its enumeration order.
    Monitor { index: usize },

    /// The first visible top level window with a title containing `title`.
    Window { title: String },
}

/// Shader files, the built in shaders are used for any that are unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shaders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presenter {
    pub clear_colour: [f32; 4],
    pub capture_cursor: bool,
}

impl Default for Presenter {
    fn default() -> Self {
        let options = LiveCaptureOptions::default();

        Self {
            clear_colour: options.clear_colour,
            capture_cursor: options.session.capture_cursor,
        }
    }
}

impl Config {
    pub fn try_load_config() -> Result<Option<Self>, toml::de::Error> {
        let mut file = match fs::File::open(Self::file_path()) {
            Ok(file) => file,
            Err(error) => {
                if error.kind() == std::io::ErrorKind::NotFound {
                    return Ok(None);
                }

                report_and_panic(
                    error,
                    "Could not check if an existing configuration file exists",
                );
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .report_and_panic("Could not read the existing configuration file");

        let config: Self = toml::from_str(&contents)?;

        Ok(Some(config))
    }

    pub fn save(&self) {
        let toml_string =
            toml::to_string_pretty(self).report_and_panic("Could not save the configuration file");

        fs::write(Self::file_path(), toml_string.as_bytes())
            .report_and_panic("Could not save the configuration file");
    }

    pub fn file_path() -> PathBuf {
        config_dir().join(FILE_NAME)
    }

    pub fn live_capture_options(&self) -> LiveCaptureOptions {
        let mut pipeline = ShaderPipelineDesc::default();

        if let Some(path) = &self.shaders.vertex {
            pipeline.vertex = ShaderProgram::vertex(ShaderSource::Path(path.clone()));
        }
        if let Some(path) = &self.shaders.pixel {
            pipeline.pixel = ShaderProgram::pixel(ShaderSource::Path(path.clone()));
        }

        LiveCaptureOptions {
            pipeline,
            clear_colour: self.presenter.clear_colour,
            session: SessionOptions {
                capture_cursor: self.presenter.capture_cursor,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use capture_presenter::{LiveCaptureOptions, ShaderPipelineDesc, ShaderProgram, ShaderSource};

    use super::{Config, Presenter, Shaders, Target};

    const DOCUMENTED: &str = r#"
[target]
kind = "primary-monitor"

[shaders]
vertex = "shaders/VertexShader.hlsl"
pixel = "shaders/PixelShader.hlsl"

[presenter]
clear_colour = [0.0, 0.0, 0.0, 1.0]
capture_cursor = true
"#;

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.target, Target::PrimaryMonitor);
        assert_eq!(config.live_capture_options(), LiveCaptureOptions::default());
    }

    #[test]
    fn documented_config() {
        let config: Config = toml::from_str(DOCUMENTED).unwrap();

        assert_eq!(config.target, Target::PrimaryMonitor);
        assert_eq!(
            config.shaders,
            Shaders {
                vertex: Some(PathBuf::from("shaders/VertexShader.hlsl")),
                pixel: Some(PathBuf::from("shaders/PixelShader.hlsl")),
            }
        );

        let options = config.live_capture_options();
        assert_eq!(
            options.pipeline.vertex,
            ShaderProgram::vertex(ShaderSource::Path("shaders/VertexShader.hlsl".into()))
        );
        assert_eq!(
            options.pipeline.pixel,
            ShaderProgram::pixel(ShaderSource::Path("shaders/PixelShader.hlsl".into()))
        );
        assert_eq!(options.clear_colour, [0.0, 0.0, 0.0, 1.0]);
        assert!(options.session.capture_cursor);
    }

    #[test]
    fn unset_shaders_use_builtin() {
        let config: Config = toml::from_str(
            r#"
[shaders]
pixel = "custom.cso"
"#,
        )
        .unwrap();

        let options = config.live_capture_options();
        let builtin = ShaderPipelineDesc::default();

        assert_eq!(options.pipeline.vertex, builtin.vertex);
        assert_eq!(
            options.pipeline.pixel,
            ShaderProgram::pixel(ShaderSource::Path("custom.cso".into()))
        );
    }

    #[test]
    fn targets_are_tagged_by_kind() {
        let monitor: Config = toml::from_str(
            r#"
[target]
kind = "monitor"
index = 1
"#,
        )
        .unwrap();
        assert_eq!(monitor.target, Target::Monitor { index: 1 });

        let window: Config = toml::from_str(
            r#"
[target]
kind = "window"
title = "Notepad"
"#,
        )
        .unwrap();
        assert_eq!(
            window.target,
            Target::Window {
                title: "Notepad".into()
            }
        );

        let unknown = toml::from_str::<Config>(
            r#"
[target]
kind = "printer"
"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn presenter_options_are_mapped() {
        let config: Config = toml::from_str(
            r#"
[presenter]
clear_colour = [0.25, 0.5, 0.75, 1.0]
capture_cursor = false
"#,
        )
        .unwrap();

        assert_eq!(
            config.presenter,
            Presenter {
                clear_colour: [0.25, 0.5, 0.75, 1.0],
                capture_cursor: false,
            }
        );

        let options = config.live_capture_options();
        assert_eq!(options.clear_colour, [0.25, 0.5, 0.75, 1.0]);
        assert!(!options.session.capture_cursor);
    }

    #[test]
    fn saved_config_loads_back() {
        let config = Config {
            target: Target::Window {
                title: "Capture Viewer".into(),
            },
            shaders: Shaders {
                vertex: Some(PathBuf::from("VertexShader.cso")),
                pixel: None,
            },
            presenter: Presenter {
                clear_colour: [1.0, 0.0, 1.0, 1.0],
                capture_cursor: false,
            },
        };

        let saved = toml::to_string_pretty(&config).unwrap();
        let loaded: Config = toml::from_str(&saved).unwrap();

        assert_eq!(loaded, config);
    }
}
