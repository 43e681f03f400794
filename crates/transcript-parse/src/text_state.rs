//! Text and graphics state for content interpretation.
//!
//! Implements the parts of the PDF text model that decide where a string
//! lands: the current transformation matrix (q/Q/cm), the text and line
//! matrices (BT/Tm/Td/TD/T*), leading, rise and the spacing parameters that
//! advance the text position (Tc/Tw/Tz).

/// A 2D affine matrix `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Text state parameters. Saved and restored with the graphics state by
/// q/Q; the text and line matrices live only inside a BT/ET block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Text leading (TL), used by T*, ' and ".
    pub leading: f64,
    /// Resource name of the current font (Tf).
    pub font_name: String,
    pub font_size: f64,
    /// Text rise (Ts).
    pub rise: f64,
    /// Character spacing (Tc), in unscaled text space units.
    pub char_spacing: f64,
    /// Word spacing (Tw), added after each single-byte space.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz) in percent.
    pub horizontal_scaling: f64,
    in_text_object: bool,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    pub fn new() -> Self {
        Self {
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            rise: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 100.0,
            in_text_object: false,
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
        }
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Matrix {
        &self.text_matrix
    }

    /// Tz as a factor.
    pub fn h_scale(&self) -> f64 {
        self.horizontal_scaling / 100.0
    }

    /// Displacement of one glyph of width `w0` (glyph space), in text space.
    pub fn glyph_advance(&self, w0: f64, is_space: bool) -> f64 {
        let word = if is_space { self.word_spacing } else { 0.0 };
        ((w0 / 1000.0) * self.font_size + self.char_spacing + word) * self.h_scale()
    }

    /// Displacement of a TJ adjustment (thousandths of text space).
    pub fn adjustment_advance(&self, adjust: f64) -> f64 {
        -(adjust / 1000.0) * self.font_size * self.h_scale()
    }

    /// BT: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.in_text_object = true;
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
    }

    /// ET.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// Tf.
    pub fn set_font(&mut self, name: impl Into<String>, size: f64) {
        self.font_name = name.into();
        self.font_size = size;
    }

    /// Tm: set both matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// Td: start a new line offset from the start of the current one.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// TD: like Td, and set leading to `-ty`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// T*: equivalent to `0 -TL Td`.
    pub fn move_to_next_line(&mut self) {
        self.move_text_position(0.0, -self.leading);
    }

    /// Shift the text matrix horizontally after showing text. `tx` is in
    /// unscaled text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translate(tx, 0.0).concat(&self.text_matrix);
    }
}

/// Graphics state stack: CTM plus text state, saved by q and restored by Q.
#[derive(Debug, Clone, Default)]
pub struct GraphicsState {
    ctm: Matrix,
    stack: Vec<(Matrix, TextState)>,
}

impl GraphicsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    /// cm: prepend a matrix to the CTM.
    pub fn concat(&mut self, m: Matrix) {
        self.ctm = m.concat(&self.ctm);
    }

    /// q.
    pub fn save(&mut self, text: &TextState) {
        self.stack.push((self.ctm, text.clone()));
    }

    /// Q. An unbalanced Q leaves the state unchanged. The text matrices are
    /// not part of the saved state, so they survive the restore.
    pub fn restore(&mut self, text: &mut TextState) {
        if let Some((ctm, saved)) = self.stack.pop() {
            self.ctm = ctm;
            text.leading = saved.leading;
            text.font_name = saved.font_name;
            text.font_size = saved.font_size;
            text.rise = saved.rise;
            text.char_spacing = saved.char_spacing;
            text.word_spacing = saved.word_spacing;
            text.horizontal_scaling = saved.horizontal_scaling;
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Device-space baseline position of the text about to be shown.
    pub fn text_origin(&self, text: &TextState) -> (f64, f64) {
        let rendering = text.text_matrix().concat(&self.ctm);
        rendering.transform_point(0.0, text.rise)
    }
}
