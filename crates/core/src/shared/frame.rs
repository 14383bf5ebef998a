/// A decoded image: contiguous pixel bytes in row-major order, tagged with
/// the id of the image it was loaded from.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// reads pixels through [`Frame::luma`].
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    image_id: String,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        image_id: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            image_id: image_id.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// Grayscale intensity of the pixel at (`x`, `y`) in [0, 255].
    ///
    /// Uses BT.601 weights on RGB(A) data, rounded like an 8-bit gray
    /// conversion. Single-channel frames are returned as-is.
    pub fn luma(&self, x: usize, y: usize) -> f64 {
        let channels = self.channels as usize;
        let offset = (y * self.width as usize + x) * channels;
        if channels < 3 {
            return self.data[offset] as f64;
        }
        let r = self.data[offset] as f64;
        let g = self.data[offset + 1] as f64;
        let b = self.data[offset + 2] as f64;
        (0.299 * r + 0.587 * g + 0.114 * b).round()
    }
}
