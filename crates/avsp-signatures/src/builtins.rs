//! Filters, aliases and clip properties that ship with the scripting engine.

use crate::registry::FilterCategory;
use crate::registry::FilterEntry;
use crate::registry::LoadError;
use crate::registry::RegistryLoader;

static CORE_FILTERS: &[(&str, &str)] = &[
    ("AddBorders", r#"(clip, int left, int top, int right, int bottom, int "color"=$000000)"#),
    ("AlignedSplice", "(clip clip1, clip clip2 [, ...])"),
    ("AssumeFPS", r#"(clip, float fps, bool "sync_audio"=false)"#),
    ("AviSource", r#"(string filename [, ...], bool "audio"=true, string "pixel_type"="FULL" (FULL/YV24/YV16/YV12/YUY2/RGB32/RGB24/Y8/AUTO), string "fourCC")"#),
    ("BicubicResize", r#"(clip, int target_width, int target_height, float "b"=0.333, float "c"=0.333)"#),
    ("BilinearResize", r#"(clip, int target_width, int target_height, float "src_left"=0.0, float "src_top"=0.0, float "src_width"=0.0, float "src_height"=0.0)"#),
    ("BlankClip", r#"(clip "clip", int "length"=240, int "width"=640, int "height"=480, string "pixel_type"="RGB32", float "fps"=24.0, int "color"=$000000)"#),
    ("Blur", r#"(clip, float amount, float "amount_v", bool "MMX"=true)"#),
    ("ColorBars", r#"(int "width"=640, int "height"=480, string "pixel_type"="RGB32")"#),
    ("ConvertToRGB32", r#"(clip, string "matrix"="Rec601" (Rec601/Rec709/PC.601/PC.709/AVERAGE), bool "interlaced"=false)"#),
    ("ConvertToYV12", r#"(clip, string "matrix"="Rec601" (Rec601/Rec709/PC.601/PC.709/AVERAGE), bool "interlaced"=false)"#),
    ("Crop", r#"(clip, int left, int top, int width, int height, bool "align"=false)"#),
    ("DirectShowSource", r#"(string filename, float "fps", bool "seek"=true, bool "audio"=true, bool "video"=true)"#),
    ("Dissolve", r#"(clip clip1, clip clip2 [, ...], int overlap, float "fps"=24.0)"#),
    ("FadeIn", r#"(clip, int num_frames, int "color"=$000000, float "fps"=24.0)"#),
    ("FadeOut", r#"(clip, int num_frames, int "color"=$000000, float "fps"=24.0)"#),
    ("FlipHorizontal", "(clip)"),
    ("FlipVertical", "(clip)"),
    ("Greyscale", r#"(clip, string "matrix" (Rec601/Rec709/AVERAGE))"#),
    ("Import", "(string filename [, ...])"),
    ("Info", "(clip)"),
    ("Interleave", "(clip clip1, clip clip2 [, ...])"),
    ("Invert", r#"(clip, string "channels"="RGBA")"#),
    ("LanczosResize", r#"(clip, int target_width, int target_height, int "taps"=3)"#),
    ("Levels", r#"(clip, int input_low, float gamma, int input_high, int output_low, int output_high, bool "coring"=true, bool "dither"=false)"#),
    ("LoadCPlugin", "(string filename [, ...])"),
    ("LoadPlugin", "(string filename [, ...])"),
    ("LoadVirtualDubPlugin", "(string filename, string filtername, int \"preroll\"=0)"),
    ("Overlay", r#"(clip, clip overlay, int "x"=0, int "y"=0, clip "mask", float "opacity"=1.0, string "mode"="blend" (blend/add/subtract/multiply/chroma/luma/lighten/darken/softlight/hardlight/difference/exclusion), bool "greymask"=true, string "output", bool "ignore_conditional"=false, bool "pc_range"=false)"#),
    ("Reverse", "(clip)"),
    ("SelectEvery", "(clip, int step_size, int offset1 [, ...])"),
    ("Sharpen", r#"(clip, float amount, float "amount_v", bool "MMX"=true)"#),
    ("Spline36Resize", r#"(clip, int target_width, int target_height)"#),
    ("StackHorizontal", "(clip clip1, clip clip2 [, ...])"),
    ("StackVertical", "(clip clip1, clip clip2 [, ...])"),
    ("Subtitle", r#"(clip, string text, float "x"=8.0, float "y"=18.0, int "first_frame"=0, int "last_frame", string "font"="Arial", float "size"=18.0, int "text_color"=$FFFF00, int "halo_color"=$000000, int "align"=7 (1/2/3/4/5/6/7/8/9), int "spc"=0)"#),
    ("Trim", r#"(clip, int first_frame, int last_frame, bool "pad"=true)"#),
    ("Tweak", r#"(clip, float "hue"=0.0, float "sat"=1.0, float "bright"=0.0, float "cont"=1.0, bool "coring"=true)"#),
    ("UnalignedSplice", "(clip clip1, clip clip2 [, ...])"),
    ("Version", "()"),
];

static CORE_ALIASES: &[(&str, &str)] = &[
    ("Grayscale", "Greyscale"),
    ("Load_Stdcall_Plugin", "LoadCPlugin"),
];

/// Clip properties and the type of the value they produce.
static CLIP_PROPERTIES: &[(&str, &str)] = &[
    ("AudioBits", "int"),
    ("AudioChannels", "int"),
    ("AudioLength", "int"),
    ("AudioRate", "int"),
    ("FrameCount", "int"),
    ("FrameRate", "float"),
    ("FrameRateDenominator", "int"),
    ("FrameRateNumerator", "int"),
    ("GetParity", "bool"),
    ("HasAudio", "bool"),
    ("HasVideo", "bool"),
    ("Height", "int"),
    ("IsAudioFloat", "bool"),
    ("IsAudioInt", "bool"),
    ("IsFieldBased", "bool"),
    ("IsFrameBased", "bool"),
    ("IsInterleaved", "bool"),
    ("IsPlanar", "bool"),
    ("IsRGB", "bool"),
    ("IsRGB24", "bool"),
    ("IsRGB32", "bool"),
    ("IsYUV", "bool"),
    ("IsYUY2", "bool"),
    ("IsYV12", "bool"),
    ("PixelType", "string"),
    ("Width", "int"),
];

/// Loads the builtin table. Clip-property entries carry their value type
/// keyword as the signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinLoader;

impl RegistryLoader for BuiltinLoader {
    fn load_entries(&self) -> Result<Vec<FilterEntry>, LoadError> {
        let filters = CORE_FILTERS
            .iter()
            .map(|(name, signature)| FilterEntry::new(*name, *signature, FilterCategory::Core));
        let aliases = CORE_ALIASES
            .iter()
            .map(|(name, target)| FilterEntry::alias(*name, *target, FilterCategory::Core));
        let properties = CLIP_PROPERTIES.iter().map(|(name, value_type)| {
            FilterEntry::new(*name, *value_type, FilterCategory::ClipProperty)
        });

        Ok(filters.chain(aliases).chain(properties).collect())
    }
}
