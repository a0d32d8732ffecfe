//! Heston stochastic volatility: parameters, Fourier pricing and smile
//! calibration.
//!
//! ## Usage
//!
//! ```
//! use fxvol_models::analytical::{FxMarket, OptionType};
//! use fxvol_models::heston::{HestonEngine, HestonParams, HestonPricer, HestonPricingConfig};
//!
//! let market = FxMarket::new(0.6629, 1.0, 0.0466, 0.05381).unwrap();
//! let params = HestonParams::new(0.01, 0.4, 1.5, 0.012, -0.2).unwrap();
//! let engine = HestonEngine::new(HestonPricer::CarrMadanFft, HestonPricingConfig::default()).unwrap();
//!
//! let px = engine.price(&params, &market, OptionType::Call, 0.70).unwrap();
//! assert!(px > 0.0);
//! ```

mod calibration;
mod char_fn;
mod error;
mod params;
mod pricing;

pub use calibration::{calibrate_heston_smile, HestonSmileFit, MIN_SMILE_QUOTES};
pub use char_fn::characteristic_function;
pub use error::HestonError;
pub use params::HestonParams;
pub use pricing::{HestonEngine, HestonPricer, HestonPricingConfig};
