//! The fixed style prompt and output size sent with every generation request.

/// Square output size requested from the generation API.
pub const OUTPUT_SIZE: &str = "1024x1024";

/// Filename the source image is uploaded under in the multipart form.
pub const SOURCE_FILENAME: &str = "input.png";

/// Style instructions for the hand-drawn pastel animated-film look.
///
/// Identity, pose and framing of the subjects must survive the restyle,
/// and the output must carry no text or watermarks.
pub const STYLE_PROMPT: &str = "\
Redraw the people and animals in this photo as a single frame from a \
hand-drawn 2-D animated feature film.

KEEP
- Each subject's face, hairstyle, clothing colours, pose and position relative to the others.
- The original framing: no zoom, no crop, no added borders.

STYLE
- Soft pastel palette with warm, gently saturated highlights.
- Thin, confident pencil linework with light hatching for shading.
- A painterly background that matches the setting of the photo.
- Diffuse daylight, no hard shadows, no lens flare.

DO NOT ADD
- Text, watermarks, signatures or logos.

OUTPUT
- One illustration.";
