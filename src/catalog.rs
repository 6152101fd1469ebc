//! Built-in procurement types and their stage templates
//!
//! Seeded into a fresh database by the migrations. Durations are in days;
//! `None` marks the variable-duration execution stage.

use crate::models::StageTemplate;

/// A procurement type as shipped with the ledger
#[derive(Debug, Clone, Copy)]
pub struct CatalogType {
    pub name: &'static str,
    /// (stage name, duration in days, weight), in sequence order
    pub stages: &'static [(&'static str, Option<u32>, f64)],
}

impl CatalogType {
    /// Stage templates numbered from 1 in listed order
    pub fn templates(&self) -> Vec<StageTemplate> {
        self.stages
            .iter()
            .enumerate()
            .map(|(i, (name, duration, weight))| StageTemplate::new(i as u32 + 1, *name, *duration, *weight))
            .collect()
    }
}

const SWAKELOLA_KERJASAMA: &[(&str, Option<u32>, f64)] = &[
    ("Reviu Bappeda", Some(7), 3.0),
    ("Penerbitan SPD", Some(7), 2.0),
    ("Penyusunan Dokumen Swakelola", Some(14), 10.0),
    ("Penandatanganan Perjanjian Kerjasama", Some(1), 5.0),
    ("Pelaksanaan Kontrak", None, 70.0),
    ("Pemeriksaan Hasil Pekerjaan", Some(7), 4.0),
    ("Serah Terima Pekerjaan", Some(1), 4.0),
    ("Pelaporan", Some(1), 2.0),
];

const E_PURCHASING_MARKET_SOUNDING: &[(&str, Option<u32>, f64)] = &[
    ("Reviu Bappeda", Some(7), 1.0),
    ("Penerbitan SPD", Some(7), 1.0),
    ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 3.0),
    ("Reviu Inspektorat", Some(7), 1.0),
    ("Reviu Barjas", Some(7), 2.0),
    ("Sosialisasi (Market Sounding)", Some(7), 1.0),
    ("Penyusunan Kertas Kerja", Some(7), 2.0),
    ("Reviu Tim Monev", Some(5), 1.0),
    ("Klik", Some(14), 2.0),
    ("Penerbitan surat pesanan", Some(4), 1.0),
    ("Penandatanganan Kontrak", Some(1), 5.0),
    ("Pelaksanaan Kontrak", None, 70.0),
    ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
    ("Serah Terima Pekerjaan", Some(1), 5.0),
];

/// Types seeded by the initial catalog migration
pub const BUILTIN_TYPES: &[CatalogType] = &[
    CatalogType {
        name: "Pengadaan Langsung",
        stages: &[
            ("Reviu Bappeda", Some(7), 3.0),
            ("Penerbitan SPD", Some(7), 2.0),
            ("Penyusunan Dokumen Pengadaan", Some(14), 4.0),
            ("Reviu Barjas", Some(7), 3.0),
            ("Reviu Tim Monev", Some(5), 3.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "E-Purchasing (Non Market Sounding)",
        stages: &[
            ("Reviu Bappeda", Some(7), 1.0),
            ("Penerbitan SPD", Some(7), 1.0),
            ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 3.0),
            ("Reviu Inspektorat", Some(7), 1.0),
            ("Reviu Barjas", Some(7), 2.0),
            ("Penyusunan Kertas Kerja", Some(7), 3.0),
            ("Reviu Tim Monev", Some(5), 1.0),
            ("Klik", Some(14), 2.0),
            ("Penerbitan surat pesanan", Some(4), 1.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "E-Purchasing (Market Sounding)",
        stages: E_PURCHASING_MARKET_SOUNDING,
    },
    CatalogType {
        name: "Seleksi",
        stages: &[
            ("Bappeda", Some(7), 1.0),
            ("SPD", Some(7), 1.0),
            ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 3.0),
            ("Rev Inspektorat", Some(7), 1.0),
            ("Reviu Barjas", Some(7), 2.0),
            ("Pokja", Some(7), 2.0),
            ("Seleksi", Some(45), 5.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Hasil Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "Tender",
        stages: &[
            ("Bappeda", Some(7), 1.0),
            ("SPD", Some(7), 1.0),
            ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 3.0),
            ("Rev Inspektorat", Some(7), 1.0),
            ("Reviu Barjas", Some(7), 2.0),
            ("Pokja", Some(7), 2.0),
            ("Proses Tender (termasuk penetapan pemenang dan masa sanggah)", Some(30), 5.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Hasil Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "Tender (Melalui Proses Evaluasi Kewajaran Harga/EKH)",
        stages: &[
            ("Bappeda", Some(7), 1.0),
            ("SPD", Some(7), 1.0),
            ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 3.0),
            ("Rev Inspektorat", Some(7), 1.0),
            ("Reviu Barjas", Some(7), 2.0),
            ("Pokja", Some(7), 2.0),
            ("Proses Tender (termasuk penetapan pemenang dan masa sanggah)", Some(45), 5.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Hasil Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "Repeat Order",
        stages: &[
            ("Reviu Bappeda", Some(7), 1.0),
            ("Reviu Tim Monev", Some(5), 2.0),
            ("Penerbitan SPD", Some(7), 1.0),
            ("Penyusunan Dokumen Persiapan Pemilihan", Some(14), 4.0),
            ("Reviu Barjas", Some(7), 3.0),
            ("Pemilihan oleh Tim Pokja", Some(7), 4.0),
            ("Penandatanganan Kontrak", Some(1), 5.0),
            ("Pelaksanaan Kontrak", None, 70.0),
            ("Pemeriksaan Hasil Pekerjaan", Some(7), 5.0),
            ("Serah Terima Pekerjaan", Some(1), 5.0),
        ],
    },
    CatalogType {
        name: "Swakelola Tipe 1",
        stages: &[
            ("Reviu Bappeda", Some(7), 2.0),
            ("Penerbitan SPD", Some(7), 2.0),
            ("Penyusunan KAK", Some(14), 16.0),
            ("Nota Pesanan", Some(1), 10.0),
            ("Pelaksanaan", None, 68.0),
            ("Pelaporan", Some(1), 2.0),
        ],
    },
    CatalogType { name: "Swakelola Tipe 2", stages: SWAKELOLA_KERJASAMA },
    CatalogType { name: "Swakelola Tipe 3", stages: SWAKELOLA_KERJASAMA },
    CatalogType { name: "Swakelola Tipe 4", stages: SWAKELOLA_KERJASAMA },
];

/// Added after the initial catalog
pub const MINI_KOMPETISI: CatalogType = CatalogType {
    name: "Mini Kompetisi",
    stages: E_PURCHASING_MARKET_SOUNDING,
};
