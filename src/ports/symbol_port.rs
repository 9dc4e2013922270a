//! Universe membership port.

use crate::domain::error::ScreenerError;
use crate::domain::universe::Scope;

pub trait SymbolPort {
    /// Exchange-qualified symbols of the index behind `scope`, in list order.
    fn load(&self, scope: Scope) -> Result<Vec<String>, ScreenerError>;
}
