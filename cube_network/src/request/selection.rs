use crate::error::{NetworkError, Result};
use cube_types::serde::{FieldReader, FieldWriter};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Which aggregate of a metric or system-resource tree a request asks for.
#[derive(FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum CalculationFlavour {
    Inclusive = 0,
    Exclusive = 1,
    Same = 2,
    None = 3,
}

/// One `(id, flavour)` pair of a request.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Selection {
    pub id: u32,
    pub flavour: CalculationFlavour,
}

impl Selection {
    pub fn new(id: u32, flavour: CalculationFlavour) -> Self {
        Self { id, flavour }
    }
}

/// `u32` count, then `(u32 id, u8 flavour)` per selection.
pub fn write_selections<W: FieldWriter>(w: &mut W, selections: &[Selection]) -> Result<()> {
    w.put(selections.len() as u32)?;
    for sel in selections {
        w.put(sel.id)?;
        w.put(sel.flavour as u8)?;
    }
    Ok(())
}

pub fn read_selections<R: FieldReader>(r: &mut R) -> Result<Vec<Selection>> {
    let count = r.get::<u32>()?;
    let mut selections = Vec::with_capacity((count as usize).min(1 << 10));
    for _ in 0..count {
        let id = r.get::<u32>()?;
        let flavour = r.get::<u8>()?;
        let flavour = CalculationFlavour::from_u8(flavour).ok_or_else(|| {
            NetworkError::unrecoverable(format!("Unknown calculation flavour {flavour}"))
        })?;
        selections.push(Selection { id, flavour });
    }
    Ok(selections)
}
