//! Fixed 10-color qualitative palette (the "Paired" scale), one color per
//! evaluation class.

pub const CLASS_COLORS: [[u8; 3]; 10] = [
    [166, 206, 227],
    [31, 120, 180],
    [178, 223, 138],
    [51, 160, 44],
    [251, 154, 153],
    [227, 26, 28],
    [253, 191, 111],
    [255, 127, 0],
    [202, 178, 214],
    [106, 61, 154],
];

/// Color assigned to `class`, wrapping past the palette size.
pub fn class_color(class: usize) -> [u8; 3] {
    CLASS_COLORS[class % CLASS_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalia::params::NUM_EVAL_CLASSES;

    #[test]
    fn one_color_per_evaluation_class() {
        assert_eq!(CLASS_COLORS.len(), NUM_EVAL_CLASSES);
    }

    #[test]
    fn colors_are_pairwise_distinct() {
        for i in 0..CLASS_COLORS.len() {
            for j in (i + 1)..CLASS_COLORS.len() {
                assert_ne!(CLASS_COLORS[i], CLASS_COLORS[j]);
            }
        }
    }

    #[test]
    fn lookup_wraps_past_the_palette() {
        assert_eq!(class_color(0), class_color(10));
    }
}
