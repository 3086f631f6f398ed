//! Geotag encoding and tagging command composition.
//!
//! A fix is written into two tag families in one exiftool call: the
//! EXIF GPS family (DMS text plus hemisphere reference letters) and the
//! XMP GPS family (signed decimal degrees), because downstream
//! photogrammetry tools disagree on which family they read. The file is
//! overwritten in place.

use std::path::Path;

use crate::telemetry::GpsFix;

/// GPS IFD version written alongside the coordinates.
const GPS_VERSION_ID: &str = "2.3.0.0";
/// Geodetic datum identifier the coordinates are expressed in.
const GPS_MAP_DATUM: &str = "WGS-84";

/// Convert an unsigned decimal-degree magnitude to DMS text.
///
/// Integer degrees and minutes, seconds to 4 decimal places. The sign
/// is dropped; hemisphere is carried separately as a reference letter.
pub fn decimal_to_dms(decimal: f64) -> String {
    let abs = decimal.abs();
    let degrees = abs.trunc();
    let minutes_decimal = (abs - degrees) * 60.0;
    let minutes = minutes_decimal.trunc();
    let seconds = (minutes_decimal - minutes) * 60.0;
    format!("{} {} {:.4}", degrees as i64, minutes as i64, seconds)
}

/// Hemisphere reference letter for a latitude.
pub fn latitude_ref(latitude: f64) -> char {
    if latitude >= 0.0 {
        'N'
    } else {
        'S'
    }
}

/// Hemisphere reference letter for a longitude.
pub fn longitude_ref(longitude: f64) -> char {
    if longitude >= 0.0 {
        'E'
    } else {
        'W'
    }
}

/// Compose the exiftool command embedding `fix` into `image`.
///
/// Altitude is tagged only when non-zero; its reference flag encodes
/// above (0) or below (1) the datum. The original file is overwritten
/// in place rather than leaving an `_original` sidecar.
pub fn exiftool_command(exiftool: &Path, image: &Path, fix: &GpsFix) -> String {
    let mut cmd = format!(
        "\"{}\" -EXIF:GPSLatitude=\"{}\" -EXIF:GPSLatitudeRef={} \
         -EXIF:GPSLongitude=\"{}\" -EXIF:GPSLongitudeRef={} \
         -EXIF:GPSVersionID=\"{}\" -EXIF:GPSMapDatum=\"{}\"",
        exiftool.display(),
        decimal_to_dms(fix.latitude),
        latitude_ref(fix.latitude),
        decimal_to_dms(fix.longitude),
        longitude_ref(fix.longitude),
        GPS_VERSION_ID,
        GPS_MAP_DATUM,
    );

    if fix.altitude != 0.0 {
        cmd.push_str(&format!(
            " -EXIF:GPSAltitude={} -EXIF:GPSAltitudeRef={}",
            fix.altitude.abs(),
            if fix.altitude >= 0.0 { 0 } else { 1 }
        ));
    }

    cmd.push_str(&format!(
        " -XMP:GPSLatitude={:.8} -XMP:GPSLongitude={:.8}",
        fix.latitude, fix.longitude
    ));

    if fix.altitude != 0.0 {
        cmd.push_str(&format!(" -XMP:GPSAltitude={}", fix.altitude.abs()));
    }

    cmd.push_str(&format!(" -overwrite_original \"{}\"", image.display()));
    cmd
}
