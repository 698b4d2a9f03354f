use std::path::Path;
use tilescape::errors::{TilescapeError, TilescapeResult};

/// Largest accepted grid side
pub const MAX_GRID_SIDE: u32 = 2048;

/// Parse size string "WIDTHxHEIGHT" with validation
pub fn parse_size(size_str: &str) -> TilescapeResult<(u32, u32)> {
    let parts: Vec<&str> = size_str.split('x').collect();
    let [width, height] = parts.as_slice() else {
        return Err(TilescapeError::InvalidArgument {
            reason: format!("Invalid size format '{size_str}'. Expected WIDTHxHEIGHT"),
        });
    };

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| TilescapeError::InvalidArgument {
                reason: format!("Invalid size value: '{part}'"),
            })
    };
    let (width, height) = (parse(width)?, parse(height)?);

    if width == 0 || height == 0 {
        return Err(TilescapeError::InvalidArgument {
            reason: "Width and height must be greater than 0".to_string(),
        });
    }

    if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
        return Err(TilescapeError::InvalidArgument {
            reason: format!("Width and height must not exceed {MAX_GRID_SIDE}"),
        });
    }

    Ok((width, height))
}

/// Reject output paths that would escape the working directory
pub fn validate_output_path(filename: &str) -> TilescapeResult<()> {
    if filename.trim().is_empty() {
        return Err(TilescapeError::InvalidArgument {
            reason: "Output path must not be empty".to_string(),
        });
    }

    if Path::new(filename)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(TilescapeError::InvalidArgument {
            reason: "Output path cannot contain '..'".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("50x50").unwrap(), (50, 50));
        assert_eq!(parse_size("128x256").unwrap(), (128, 256));
        assert_eq!(parse_size("1x1").unwrap(), (1, 1));

        assert!(parse_size("64").is_err());
        assert!(parse_size("0x64").is_err());
        assert!(parse_size("3000x64").is_err());
        assert!(parse_size("12.5x4").is_err());
        assert!(parse_size("4x4x4").is_err());
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path("landscape.json").is_ok());
        assert!(validate_output_path("out/landscape.bin").is_ok());
        assert!(validate_output_path("../landscape.json").is_err());
        assert!(validate_output_path("  ").is_err());
    }
}
