use anyhow::Result;

use crate::quickdraw::QuickDraw;

use super::FrameInfo;

/// An overlay component that takes part in every frame.
///
/// `begin_frame` runs before the user draw function; `finalize_frame` runs
/// after the user's geometry was submitted and draws on top of it.
pub trait FrameParticipant {
    fn name(&self) -> &str;

    fn begin_frame(&mut self, _info: &FrameInfo<'_>) -> Result<()> {
        Ok(())
    }

    fn finalize_frame(&mut self, info: &FrameInfo<'_>, quick_draw: &mut QuickDraw) -> Result<()>;
}
