#![doc = r#"
PMOConvert - Conversion de formats d'échantillons PCM

Cette crate convertit des buffers d'échantillons entre six encodages binaires
(`Float32`, `Int32`, `Int24` compacté sur 3 octets, `Int16`, `Int8`, `UInt8`
biaisé de 128), avec clipping et dither triangulaire optionnels. Elle fournit
aussi l'écriture du silence et la négociation du format le plus proche
supporté par un périphérique.

# Architecture

```text
ConvertConfig ─→ ConversionSession ─→ select_converter ─→ Converter::convert
                     │                      │                 (noyau scalaire,
                     │                      └─ Acceleration     SSSE3 ou NEON)
                     └─ select_zeroer ─→ Zeroer::zero
```

Les buffers sont des tranches d'octets opaques parcourues avec un pas
exprimé en éléments (3 octets par élément pour Int24). Chaque flux possède
son [`DitherState`] ; les convertisseurs sont des valeurs immuables.

# Exemple

```
use pmoconvert::{Acceleration, ConversionFlags, DitherState, SampleFormat, select_converter};

let converter = select_converter(
    SampleFormat::Float32,
    SampleFormat::Int16,
    ConversionFlags::CLIP_OFF | ConversionFlags::DITHER_OFF,
    Acceleration::detect(),
)
.unwrap();

let src: Vec<u8> = [0.5f32, -0.5].iter().flat_map(|x| x.to_ne_bytes()).collect();
let mut dst = vec![0u8; 4];
let mut dither = DitherState::new();
converter.convert(&mut dst, 1, &src, 1, 2, &mut dither).unwrap();

assert_eq!(i16::from_ne_bytes([dst[0], dst[1]]), 16383);
```
"#]

pub mod accel;
pub mod buffer;
pub mod config;
pub mod dither;
pub mod error;
pub mod format;
pub mod int24;
pub mod kernels;
pub mod negotiation;
pub mod selector;
pub mod session;
pub mod zeroer;

pub use accel::{Acceleration, AccelerationPolicy, KernelStrategy};
pub use config::{ConfigError, ConvertConfig};
pub use dither::DitherState;
pub use error::{BufferRole, ConvertError};
pub use format::{ConversionFlags, SampleFormat, SampleFormatMask};
pub use int24::I24;
pub use kernels::{ConverterFn, KernelId};
pub use negotiation::{closest_format, select_closest_available_format};
pub use selector::{kernel_for, select_converter, select_converter_for_masks, Converter};
pub use session::ConversionSession;
pub use zeroer::{select_zeroer, select_zeroer_for_mask, Zeroer, ZeroerFn};
