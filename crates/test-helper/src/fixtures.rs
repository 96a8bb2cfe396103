use capture_presenter::{
    LiveCapture, LiveCaptureOptions, Size,
    software::{
        Delivery, FaultInjector, Journal, SoftwareCaptureItem, SoftwareDevice, SoftwareTexture,
    },
};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Top-left red, top-right green, bottom-left blue, bottom-right white.
pub const QUADRANT_COLOURS: [[u8; 4]; 4] = [RED, GREEN, BLUE, WHITE];

pub fn quadrants(size: Size) -> SoftwareTexture {
    SoftwareTexture::quadrants(size, QUADRANT_COLOURS)
}

pub fn solid(size: Size) -> SoftwareTexture {
    SoftwareTexture::solid(size, WHITE)
}

/// A started software capture with handles to its journal, faults and source.
pub struct Harness {
    pub capture: LiveCapture<SoftwareDevice>,
    pub item: SoftwareCaptureItem,
    pub journal: Journal,
    pub faults: FaultInjector,
}

impl Harness {
    pub fn new(size: Size) -> Self {
        Self::with_options(size, LiveCaptureOptions::default())
    }

    pub fn with_options(size: Size, options: LiveCaptureOptions) -> Self {
        let device = SoftwareDevice::new();
        let journal = device.journal();
        let faults = device.faults();
        let item = SoftwareCaptureItem::new(size);

        let capture = LiveCapture::new(device, item.clone(), options).unwrap();
        capture.start_capture().unwrap();

        Self {
            capture,
            item,
            journal,
            faults,
        }
    }

    /// Push a solid frame of `size` and assert it was delivered.
    pub fn push(&self, size: Size) {
        self.push_texture(solid(size));
    }

    pub fn push_texture(&self, texture: SoftwareTexture) {
        let delivery = self.item.push_frame(texture);
        assert_eq!(delivery, Delivery::Delivered, "Frame should have been delivered");
    }
}

/// If every channel of `actual` is within `tolerance` of `expected`.
pub fn close_to(actual: [u8; 4], expected: [u8; 4], tolerance: u8) -> bool {
    actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= tolerance)
}
