//! 波利姆多（Politeknik Negeri Manado）课程目录

/// 目录中的一门课程
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCourse {
    pub code: &'static str,
    pub name: &'static str,
    pub credits: i32,
    pub semester: i32,
}

impl CatalogCourse {
    const fn new(code: &'static str, name: &'static str, credits: i32, semester: i32) -> Self {
        Self {
            code,
            name,
            credits,
            semester,
        }
    }

    pub fn description(&self, program_study: &str) -> String {
        format!(
            "Mata kuliah {} untuk Program Studi {} semester {}",
            self.name, program_study, self.semester
        )
    }
}

/// 按专业分组，顺序即播种顺序
pub const POLIMDO_CATALOG: &[(&str, &[CatalogCourse])] = &[
    (
        "Teknik Informatika",
        &[
            CatalogCourse::new("TI101", "Algoritma dan Pemrograman I", 3, 1),
            CatalogCourse::new("TI102", "Matematika Diskrit", 3, 1),
            CatalogCourse::new("TI103", "Pengantar Teknologi Informasi", 2, 1),
            CatalogCourse::new("TI104", "Bahasa Inggris I", 2, 1),
            CatalogCourse::new("TI105", "Pancasila", 2, 1),
            CatalogCourse::new("TI106", "Sistem Digital", 3, 1),
            CatalogCourse::new("TI107", "Fisika Dasar", 3, 1),
            CatalogCourse::new("TI201", "Algoritma dan Pemrograman II", 3, 2),
            CatalogCourse::new("TI202", "Struktur Data", 3, 2),
            CatalogCourse::new("TI203", "Matematika Terapan", 3, 2),
            CatalogCourse::new("TI204", "Bahasa Inggris II", 2, 2),
            CatalogCourse::new("TI205", "Kewarganegaraan", 2, 2),
            CatalogCourse::new("TI206", "Organisasi dan Arsitektur Komputer", 3, 2),
            CatalogCourse::new("TI207", "Elektronika Dasar", 3, 2),
            CatalogCourse::new("TI301", "Pemrograman Berorientasi Objek", 3, 3),
            CatalogCourse::new("TI302", "Basis Data I", 3, 3),
            CatalogCourse::new("TI303", "Sistem Operasi", 3, 3),
            CatalogCourse::new("TI304", "Jaringan Komputer I", 3, 3),
            CatalogCourse::new("TI305", "Statistika dan Probabilitas", 3, 3),
            CatalogCourse::new("TI306", "Interaksi Manusia dan Komputer", 2, 3),
            CatalogCourse::new("TI307", "Bahasa Indonesia", 2, 3),
            CatalogCourse::new("TI401", "Rekayasa Perangkat Lunak", 3, 4),
            CatalogCourse::new("TI402", "Basis Data II", 3, 4),
            CatalogCourse::new("TI403", "Pemrograman Web I", 3, 4),
            CatalogCourse::new("TI404", "Jaringan Komputer II", 3, 4),
            CatalogCourse::new("TI405", "Analisis dan Perancangan Sistem", 3, 4),
            CatalogCourse::new("TI406", "Metodologi Penelitian", 2, 4),
            CatalogCourse::new("TI407", "Grafika Komputer", 3, 4),
            CatalogCourse::new("TI501", "Pemrograman Web II", 3, 5),
            CatalogCourse::new("TI502", "Keamanan Jaringan", 3, 5),
            CatalogCourse::new("TI503", "Kecerdasan Buatan", 3, 5),
            CatalogCourse::new("TI504", "Data Mining", 3, 5),
            CatalogCourse::new("TI505", "Mobile Programming", 3, 5),
            CatalogCourse::new("TI506", "E-Commerce", 2, 5),
            CatalogCourse::new("TI507", "Sistem Informasi Manajemen", 3, 5),
            CatalogCourse::new("TI601", "Kerja Praktik", 2, 6),
            CatalogCourse::new("TI602", "Proyek Akhir", 4, 6),
            CatalogCourse::new("TI603", "Sistem Terdistribusi", 3, 6),
            CatalogCourse::new("TI604", "Cloud Computing", 3, 6),
            CatalogCourse::new("TI605", "Internet of Things (IoT)", 3, 6),
            CatalogCourse::new("TI606", "Teknologi Multimedia", 3, 6),
            CatalogCourse::new("TI607", "Kewirausahaan", 2, 6),
        ],
    ),
    (
        "Teknik Elektro",
        &[
            CatalogCourse::new("TE101", "Matematika Teknik I", 3, 1),
            CatalogCourse::new("TE102", "Fisika Teknik I", 3, 1),
            CatalogCourse::new("TE103", "Kimia Dasar", 2, 1),
            CatalogCourse::new("TE104", "Gambar Teknik", 2, 1),
            CatalogCourse::new("TE105", "Pengantar Teknik Elektro", 2, 1),
            CatalogCourse::new("TE106", "Bahasa Inggris I", 2, 1),
            CatalogCourse::new("TE107", "Pancasila", 2, 1),
            CatalogCourse::new("TE201", "Matematika Teknik II", 3, 2),
            CatalogCourse::new("TE202", "Fisika Teknik II", 3, 2),
            CatalogCourse::new("TE203", "Rangkaian Listrik I", 3, 2),
            CatalogCourse::new("TE204", "Elektronika Analog I", 3, 2),
            CatalogCourse::new("TE205", "Pemrograman Komputer", 2, 2),
            CatalogCourse::new("TE206", "Bahasa Inggris II", 2, 2),
            CatalogCourse::new("TE207", "Kewarganegaraan", 2, 2),
        ],
    ),
    (
        "Akuntansi",
        &[
            CatalogCourse::new("AK101", "Pengantar Akuntansi I", 3, 1),
            CatalogCourse::new("AK102", "Matematika Bisnis", 3, 1),
            CatalogCourse::new("AK103", "Pengantar Ekonomi Mikro", 3, 1),
            CatalogCourse::new("AK104", "Bahasa Inggris Bisnis I", 2, 1),
            CatalogCourse::new("AK105", "Pancasila", 2, 1),
            CatalogCourse::new("AK106", "Pengantar Teknologi Informasi", 2, 1),
            CatalogCourse::new("AK107", "Komunikasi Bisnis", 2, 1),
        ],
    ),
];

pub fn program(name: &str) -> Option<(&'static str, &'static [CatalogCourse])> {
    POLIMDO_CATALOG
        .iter()
        .find(|(program, _)| *program == name)
        .copied()
}

pub fn program_names() -> impl Iterator<Item = &'static str> {
    POLIMDO_CATALOG.iter().map(|(program, _)| *program)
}
