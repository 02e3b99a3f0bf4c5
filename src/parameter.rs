use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Error;




/**
 * Physical and numerical parameters of a run. Parameter files are JSON
 * objects; keys left out take their default values.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// Reynolds number
    pub re: f64,

    /// SOR relaxation factor, in (0, 2)
    pub omega: f64,

    /// Donor-cell upwind weight, in [0, 1]
    pub alpha: f64,

    /// Largest admissible time step
    pub dt: f64,

    /// End time of the run
    pub tend: f64,

    /// Maximum number of relaxation cycles per time step
    pub iter_max: usize,

    /// Residual tolerance of the pressure solve
    pub eps: f64,

    /// Safety factor for the adaptive time step. Zero disables the adaptive
    /// step, and `dt` is used as is.
    pub tau: f64,
}




// ============================================================================
impl Default for Parameter {
    fn default() -> Self {
        Self {
            re: 1000.0,
            omega: 1.7,
            alpha: 0.9,
            dt: 0.2,
            tend: 16.4,
            iter_max: 100,
            eps: 0.001,
            tau: 0.5,
        }
    }
}




// ============================================================================
impl Parameter {

    /**
     * Check that the parameters describe a runnable configuration.
     */
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("re", self.re),
            ("dt", self.dt),
            ("tend", self.tend),
            ("eps", self.eps),
        ];
        for &(name, value) in positive.iter() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::InvalidParameter(name, value));
            }
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidParameter("alpha", self.alpha));
        }
        if !(self.tau >= 0.0 && self.tau.is_finite()) {
            return Err(Error::InvalidParameter("tau", self.tau));
        }
        if self.iter_max == 0 {
            return Err(Error::InvalidParameter("iter_max", 0.0));
        }
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(Error::InvalidRelaxation(self.omega));
        }
        Ok(())
    }

    /**
     * Parse and validate parameters from JSON text.
     */
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let parameter: Self = serde_json::from_str(text).map_err(|e| Error::Load(e.to_string()))?;
        parameter.validate()?;
        Ok(parameter)
    }

    /**
     * Read parameters from a JSON file.
     */
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use crate::error::Error;
    use super::Parameter;

    #[test]
    fn defaults_are_valid() {
        let param = Parameter::default();
        assert!(param.validate().is_ok());
        assert_eq!(param.iter_max, 100);
        assert_eq!(param.re, 1000.0);
    }

    #[test]
    fn invalid_values_name_the_parameter() {
        let param = Parameter { re: 0.0, ..Parameter::default() };
        assert!(matches!(param.validate(), Err(Error::InvalidParameter("re", _))));

        let param = Parameter { alpha: 1.5, ..Parameter::default() };
        assert!(matches!(param.validate(), Err(Error::InvalidParameter("alpha", _))));

        let param = Parameter { iter_max: 0, ..Parameter::default() };
        assert!(matches!(param.validate(), Err(Error::InvalidParameter("iter_max", _))));

        let param = Parameter { tau: f64::NAN, ..Parameter::default() };
        assert!(matches!(param.validate(), Err(Error::InvalidParameter("tau", _))));

        let param = Parameter { omega: 2.0, ..Parameter::default() };
        assert!(matches!(param.validate(), Err(Error::InvalidRelaxation(_))));
    }

    #[test]
    fn parameters_survive_a_json_round_trip() {
        let param = Parameter { re: 250.0, omega: 1.5, iter_max: 400, tau: 0.0, ..Parameter::default() };
        let text = serde_json::to_string(&param).unwrap();
        assert_eq!(Parameter::from_json(&text).unwrap(), param);
    }

    #[test]
    fn missing_keys_take_default_values() {
        let param = Parameter::from_json(r#"{ "re": 100.0, "iter_max": 50 }"#).unwrap();
        assert_eq!(param.re, 100.0);
        assert_eq!(param.iter_max, 50);
        assert_eq!(param.omega, Parameter::default().omega);
        assert_eq!(param.tend, Parameter::default().tend);
    }

    #[test]
    fn loaded_parameters_are_validated() {
        assert!(matches!(Parameter::from_json(r#"{ "omega": 2.5 }"#), Err(Error::InvalidRelaxation(_))));
        assert!(matches!(Parameter::from_json(r#"{ "re": "fast" }"#), Err(Error::Load(_))));
        assert!(matches!(Parameter::from_json("not json"), Err(Error::Load(_))));
    }

    #[test]
    fn parameters_load_from_a_file() {
        let path = std::env::temp_dir().join(format!("cavity-parameter-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "re": 400.0, "eps": 1e-4 }"#).unwrap();
        let param = Parameter::load(&path);
        std::fs::remove_file(&path).unwrap();

        let param = param.unwrap();
        assert_eq!(param.re, 400.0);
        assert_eq!(param.eps, 1e-4);
        assert!(matches!(Parameter::load(&path), Err(Error::Load(_))));
    }
}
