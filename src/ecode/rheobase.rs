use log::info;
use crate::ecode::{Ecode, EcodeError};
/// Re-expresses the amplitudes of every recording of a cell relative to its rheobase.
///
/// The rheobase is checked before anything is touched, so an invalid value
/// leaves all recordings as they were.
pub fn normalize_to_rheobase(ecodes: &mut [Ecode], rheobase: f64) -> Result<(), EcodeError> {
    if !rheobase.is_finite() || rheobase == 0.0 {
        return Err(EcodeError::InvalidThreshold(rheobase));
    }
    for ecode in ecodes.iter_mut() {
        ecode.compute_relative_amp(rheobase)?;
    }
    info!("Normalised {} recording(s) to rheobase {rheobase}", ecodes.len());
    Ok(())
}
