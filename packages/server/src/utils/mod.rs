pub mod hash;
pub mod jwt;
pub mod media;
pub mod multipart;
pub mod otp;
