use core::fmt;

#[cfg(feature = "firmware")]
use esp_wifi::wifi::WifiError;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while bringing up the receiver or capturing a CSI sample.
#[derive(Debug)]
pub enum Error {
    /// A configuration value was rejected before reaching the driver.
    ConfigError(&'static str),
    /// The driver handed over data that cannot be represented.
    SystemError(&'static str),
    /// A raw driver call returned a non-success code.
    DriverError(i32),
    #[cfg(feature = "firmware")]
    /// The WiFi controller rejected a request.
    WifiError(WifiError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
            Error::SystemError(msg) => write!(f, "system error: {}", msg),
            Error::DriverError(code) => write!(f, "driver returned error code {}", code),
            #[cfg(feature = "firmware")]
            Error::WifiError(e) => write!(f, "wifi error: {:?}", e),
        }
    }
}

#[cfg(feature = "firmware")]
impl From<WifiError> for Error {
    fn from(e: WifiError) -> Self {
        Error::WifiError(e)
    }
}
