//! Local validation of a candidate VCF upload. Pure, no I/O.

use crate::submit::UploadFile;

/// Hard cap on upload size; matches the service-side limit so oversized files
/// are rejected before any bytes leave the client.
pub const MAX_VCF_BYTES: usize = 5 * 1024 * 1024;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRejection {
    #[error("Only .vcf files are accepted")]
    NotVcf,
    #[error("File must be under 5MB")]
    TooLarge,
}

/// Accepts a file iff its name ends in `.vcf` (case-sensitive, as the service
/// checks it) and its size does not exceed [`MAX_VCF_BYTES`]. The bound is
/// inclusive: a file of exactly 5 MB passes.
pub fn validate_upload(file: &UploadFile) -> Result<(), FileRejection> {
    if !file.name.ends_with(".vcf") {
        return Err(FileRejection::NotVcf);
    }
    if file.size() > MAX_VCF_BYTES {
        return Err(FileRejection::TooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FileRejection, MAX_VCF_BYTES, validate_upload};
    use crate::submit::UploadFile;

    fn file(name: &str, size: usize) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            content: vec![b'#'; size],
        }
    }

    #[test]
    fn accepts_small_vcf() {
        assert_eq!(validate_upload(&file("patient.vcf", 1024)), Ok(()));
    }

    #[test]
    fn rejects_wrong_extension_regardless_of_size() {
        let err = validate_upload(&file("notes.txt", 10)).unwrap_err();
        assert_eq!(err, FileRejection::NotVcf);
        assert_eq!(err.to_string(), "Only .vcf files are accepted");
    }

    #[test]
    fn rejects_uppercase_extension() {
        // Extension check is case-sensitive, matching the service.
        assert_eq!(
            validate_upload(&file("patient.VCF", 10)),
            Err(FileRejection::NotVcf)
        );
    }

    #[test]
    fn rejects_oversized_file_regardless_of_extension() {
        let err = validate_upload(&file("patient.vcf", MAX_VCF_BYTES + 1)).unwrap_err();
        assert_eq!(err, FileRejection::TooLarge);
        assert_eq!(err.to_string(), "File must be under 5MB");
    }

    #[test]
    fn size_bound_is_inclusive() {
        assert_eq!(validate_upload(&file("patient.vcf", MAX_VCF_BYTES)), Ok(()));
    }

    #[test]
    fn extension_check_runs_before_size_check() {
        assert_eq!(
            validate_upload(&file("huge.txt", MAX_VCF_BYTES + 1)),
            Err(FileRejection::NotVcf)
        );
    }
}
