use crate::errors::{ExportError, ExportResult};

/// Page and typography settings for exported documents, in millimetres and
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub line_height_mm: f32,
    /// Extra right inset applied to numbered points.
    pub point_inset_mm: f32,
    pub body_size_pt: f32,
    pub salutation_size_pt: f32,
    pub title_size_pt: f32,
}

impl PageGeometry {
    /// Portrait A4 with 20 mm margins.
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 20.0,
            line_height_mm: 6.0,
            point_inset_mm: 10.0,
            body_size_pt: 11.0,
            salutation_size_pt: 12.0,
            title_size_pt: 14.0,
        }
    }

    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn bottom_limit_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }

    pub fn validate(&self) -> ExportResult<()> {
        if self.content_width_mm() <= self.point_inset_mm {
            return Err(ExportError::Geometry(format!(
                "content width {:.1}mm leaves no room for text",
                self.content_width_mm()
            )));
        }
        if self.bottom_limit_mm() - self.margin_mm < self.line_height_mm {
            return Err(ExportError::Geometry(format!(
                "page height {:.1}mm cannot hold a line",
                self.height_mm
            )));
        }
        if self.body_size_pt <= 0.0 || self.line_height_mm <= 0.0 {
            return Err(ExportError::Geometry(
                "font size and line height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
