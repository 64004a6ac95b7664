use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Phrases that commonly appear as document watermarks.
pub const WATERMARK_TEXTS: &[&str] = &[
    "CONFIDENTIAL",
    "DRAFT",
    "COPY",
    "ORIGINAL",
    "DUPLICATE",
    "SAMPLE",
    "SPECIMEN",
    "VOID",
    "CANCELLED",
    "EXPIRED",
    "INVALID",
    "APPROVED",
    "REJECTED",
    "PENDING",
    "CLASSIFIED",
    "RESTRICTED",
    "PRIVATE",
    "PUBLIC",
    "OFFICIAL",
    "UNOFFICIAL",
    "CERTIFIED",
    "UNCERTIFIED",
    "AUTHENTICATED",
    "VERIFIED",
    "PROPRIETARY",
    "COPYRIGHT",
    "TRADEMARK",
    "PATENT PENDING",
    "TRADE SECRET",
    "INTERNAL USE ONLY",
    "DO NOT COPY",
    "DO NOT DISTRIBUTE",
    "FOR REVIEW ONLY",
    "NOT FOR SALE",
    "PROOF",
    "FINAL",
    "PRELIMINARY",
    "WORKING COPY",
    "MASTER COPY",
    "CONTROLLED DOCUMENT",
    "UNCONTROLLED",
    "OBSOLETE",
    "SUPERSEDED",
    "PAID",
    "UNPAID",
    "OVERDUE",
    "RECEIVED",
    "PROCESSED",
    "AUDITED",
    "RECONCILED",
    "BUDGET",
    "ESTIMATE",
    "INVOICE",
    "STATEMENT",
    "QUOTE",
    "PROPOSAL",
    "URGENT",
    "PRIORITY",
    "RUSH",
    "HOLD",
    "FILE COPY",
    "REFERENCE ONLY",
    "ARCHIVE",
    "DESTROY AFTER USE",
    "RETAIN UNTIL",
    "EXPIRES ON",
    "EFFECTIVE DATE",
    "REVISION",
    "VERSION",
    "AMENDMENT",
    "TRANSCRIPT",
    "DIPLOMA",
    "CERTIFICATE",
    "LICENSE",
    "PRESCRIPTION",
    "MEDICAL RECORD",
    "TEST RESULTS",
    "LAB REPORT",
    "STUDENT COPY",
    "INSTRUCTOR COPY",
    "EXAMINATION",
    "ANSWER KEY",
    "WATERMARKED",
    "DIGITAL COPY",
    "ELECTRONIC VERSION",
    "SCANNED",
    "PHOTOGRAPHED",
    "REPRODUCED",
    "ENHANCED",
    "EDITED",
    "UNEDITED",
    "RAW",
    "COMPRESSED",
    "HIGH RESOLUTION",
    "LOW RESOLUTION",
    "PREVIEW",
    "THUMBNAIL",
    "CURRENT",
    "OUTDATED",
    "HISTORICAL",
    "ARCHIVED",
    "TEMPORARY",
    "PERMANENT",
    "LIMITED TIME",
    "SEASONAL",
    "ANNUAL",
    "QUARTERLY",
    "MONTHLY",
    "DAILY",
];

/// Company names used by the logo and corner styles.
pub const BRAND_NAMES: &[&str] = &[
    "ACME Corp",
    "TechVision",
    "DataSoft",
    "CloudNet",
    "InfoSys",
    "Digital Solutions",
    "Smart Systems",
    "Global Tech",
    "ProServices",
];

/// RGB palette shared by the multi-instance text style.
pub const COLOR_PALETTE: &[[u8; 3]] = &[
    [255, 255, 255], // white
    [200, 200, 200], // light gray
    [150, 150, 255], // light blue
    [255, 180, 180], // pinkish red
    [180, 255, 180], // soft green
    [255, 220, 150], // warm orange
];

pub const STAMP_TEXTS: &[&str] = &["APPROVED", "CERTIFIED", "VERIFIED", "OFFICIAL"];

pub const MOSAIC_TEXTS: &[&str] = &["PROTECTED", "SECURE", "PRIVATE"];

pub const GRID_SYMBOLS: &[&str] = &["\u{2022}", "\u{00d7}", "+", "\u{25ca}", "\u{25cb}"];

pub fn watermark_text(rng: &mut StdRng) -> &'static str {
    WATERMARK_TEXTS.choose(rng).copied().unwrap_or("CONFIDENTIAL")
}

pub fn palette_color(rng: &mut StdRng) -> [u8; 3] {
    COLOR_PALETTE.choose(rng).copied().unwrap_or([255, 255, 255])
}
