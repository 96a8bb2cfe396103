use crate::{AddressMode, Size};

/// A CPU texture, four 8 bit channels per texel in red, green, blue, alpha order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareTexture {
    size: Size,
    texels: Vec<[u8; 4]>,
}

impl SoftwareTexture {
    /// A transparent black texture.
    pub fn new(size: Size) -> Self {
        Self::solid(size, [0, 0, 0, 0])
    }

    /// A texture filled with one colour.
    pub fn solid(size: Size, colour: [u8; 4]) -> Self {
        Self {
            size,
            texels: vec![colour; size.area() as usize],
        }
    }

    /// A texture from row-major texels, `None` if the texel count does not match the size.
    pub fn from_texels(size: Size, texels: Vec<[u8; 4]>) -> Option<Self> {
        if texels.len() as u64 != size.area() {
            return None;
        }

        Some(Self { size, texels })
    }

    /// A texture split into four equal quadrants, top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(size: Size, colours: [[u8; 4]; 4]) -> Self {
        let half_width = size.width.div_ceil(2);
        let half_height = size.height.div_ceil(2);

        let texels = (0..size.height)
            .flat_map(|y| (0..size.width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let column = usize::from(x >= half_width);
                let row = usize::from(y >= half_height);
                colours[row * 2 + column]
            })
            .collect();

        Self { size, texels }
    }

    /// The texture size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The texel at `(x, y)`, `None` if out of bounds.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }

        Some(self.texels[self.index(x, y)])
    }

    /// All texels in row-major order.
    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    pub(crate) fn fill(&mut self, colour: [u8; 4]) {
        self.texels.fill(colour);
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, colour: [u8; 4]) {
        let index = self.index(x, y);
        self.texels[index] = colour;
    }

    /// Fetch a texel with out of range coordinates resolved by `mode`.
    pub(crate) fn fetch(&self, x: i64, y: i64, mode: AddressMode) -> [u8; 4] {
        let width = i64::from(self.size.width);
        let height = i64::from(self.size.height);

        let (x, y) = match mode {
            AddressMode::Wrap => (x.rem_euclid(width), y.rem_euclid(height)),
        };

        self.texels[(y * width + x) as usize]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }
}
