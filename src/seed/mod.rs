//! Built-in data: the example trees shown when the catalog is empty, and the
//! predefined species list admins can bulk-insert.

use crate::mapper;
use crate::models::{NewTreeRow, Tree};

/// Location used for the predefined species batch.
pub const DEFAULT_LOCATION: &str = "EMEA College";

struct ExampleTree {
    id: &'static str,
    scientific_name: &'static str,
    family: &'static str,
    common_name_english: &'static str,
    common_name_malayalam: &'static str,
    native_range: &'static str,
    location: &'static str,
    description: &'static str,
    image_url: &'static str,
    added_date: &'static str,
}

const EXAMPLE_TREES: &[ExampleTree] = &[
    ExampleTree {
        id: "1",
        scientific_name: "Quercus robur",
        family: "Fagaceae",
        common_name_english: "English Oak",
        common_name_malayalam: "ഓക്ക്",
        native_range: "Europe, Western Asia",
        location: "North Campus",
        description: "A magnificent oak tree estimated to be over 200 years old. It provides shade for students and habitat for local wildlife.",
        image_url: "https://images.unsplash.com/photo-1542202229-7d93c33f5d07",
        added_date: "2023-10-15",
    },
    ExampleTree {
        id: "2",
        scientific_name: "Acer palmatum",
        family: "Sapindaceae",
        common_name_english: "Japanese Maple",
        common_name_malayalam: "ജാപ്പനീസ് മേപ്പിൾ",
        native_range: "Japan, Korea, China",
        location: "East Garden",
        description: "Known for its stunning red foliage, this Japanese maple adds vibrant color to the garden throughout autumn.",
        image_url: "https://images.unsplash.com/photo-1567641091594-13a9faa0f814",
        added_date: "2023-11-02",
    },
    ExampleTree {
        id: "3",
        scientific_name: "Salix babylonica",
        family: "Salicaceae",
        common_name_english: "Weeping Willow",
        common_name_malayalam: "വില്ലോ മരം",
        native_range: "Northern China",
        location: "Lakeside",
        description: "This graceful willow with its sweeping branches creates a peaceful atmosphere by the college lake.",
        image_url: "https://images.unsplash.com/photo-1636680271758-1d4c155a6e8d",
        added_date: "2023-09-28",
    },
    ExampleTree {
        id: "4",
        scientific_name: "Betula pendula",
        family: "Betulaceae",
        common_name_english: "Silver Birch",
        common_name_malayalam: "വെള്ളി ബിർച്ച്",
        native_range: "Europe, Asia",
        location: "West Campus",
        description: "Distinguished by its white bark, this birch tree stands in contrast to the surrounding vegetation.",
        image_url: "https://images.unsplash.com/photo-1516214104703-d870798883c5",
        added_date: "2024-01-12",
    },
    ExampleTree {
        id: "5",
        scientific_name: "Sequoia sempervirens",
        family: "Cupressaceae",
        common_name_english: "Coast Redwood",
        common_name_malayalam: "തീരദേശ റെഡ്‌വുഡ്",
        native_range: "California, Oregon",
        location: "Central Plaza",
        description: "A young coastal redwood planted as part of the college's commitment to growing future heritage trees.",
        image_url: "https://images.unsplash.com/photo-1503785640985-f62e3aeee448",
        added_date: "2023-12-08",
    },
];

/// The example trees, in display order.
pub fn example_trees() -> Vec<Tree> {
    EXAMPLE_TREES
        .iter()
        .map(|t| Tree {
            id: t.id.to_string(),
            name: t.scientific_name.to_string(),
            scientific_name: t.scientific_name.to_string(),
            family: t.family.to_string(),
            common_name_english: t.common_name_english.to_string(),
            common_name_malayalam: Some(t.common_name_malayalam.to_string()),
            native_range: Some(t.native_range.to_string()),
            species: t.scientific_name.to_string(),
            location: t.location.to_string(),
            description: t.description.to_string(),
            image_url: t.image_url.to_string(),
            added_date: t.added_date.to_string(),
            pending_image: mapper::is_pending_image(t.image_url),
        })
        .collect()
}

/// Look up an example tree by id.
pub fn example_tree(id: &str) -> Option<Tree> {
    example_trees().into_iter().find(|t| t.id == id)
}

// (scientific name, family, English name, Malayalam name, native range)
type Species = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
);

const PREDEFINED_SPECIES: &[Species] = &[
    ("Mangifera indica", "Anacardiaceae", "Mango", Some("മാവ്"), Some("South Asia")),
    ("Artocarpus heterophyllus", "Moraceae", "Jackfruit", Some("പ്ലാവ്"), Some("Western Ghats")),
    ("Cocos nucifera", "Arecaceae", "Coconut palm", Some("തെങ്ങ്"), Some("Tropical Asia, Pacific")),
    ("Azadirachta indica", "Meliaceae", "Neem", Some("വേപ്പ്"), Some("Indian subcontinent")),
    ("Tamarindus indica", "Fabaceae", "Tamarind", Some("പുളി"), Some("Tropical Africa")),
    ("Ficus benghalensis", "Moraceae", "Banyan", Some("പേരാൽ"), Some("Indian subcontinent")),
    ("Ficus religiosa", "Moraceae", "Sacred fig", Some("അരയാൽ"), Some("Indian subcontinent, Indochina")),
    ("Tectona grandis", "Lamiaceae", "Teak", Some("തേക്ക്"), Some("South and Southeast Asia")),
    ("Terminalia catappa", "Combretaceae", "Indian almond", None, Some("Tropical Asia, Australia")),
    ("Delonix regia", "Fabaceae", "Flame tree", None, Some("Madagascar")),
    ("Cassia fistula", "Fabaceae", "Golden shower", Some("കണിക്കൊന്ന"), Some("Indian subcontinent")),
    ("Pongamia pinnata", "Fabaceae", "Indian beech", None, Some("Tropical Asia, Australia")),
    ("Samanea saman", "Fabaceae", "Rain tree", None, Some("Central and South America")),
    ("Peltophorum pterocarpum", "Fabaceae", "Copperpod", None, Some("Tropical Southeast Asia")),
    ("Polyalthia longifolia", "Annonaceae", "Mast tree", None, Some("India, Sri Lanka")),
    ("Swietenia macrophylla", "Meliaceae", "Big-leaf mahogany", None, Some("Central and South America")),
    ("Swietenia mahagoni", "Meliaceae", "West Indian mahogany", None, Some("Caribbean, Florida")),
    ("Alstonia scholaris", "Apocynaceae", "Blackboard tree", Some("ഏഴിലംപാല"), Some("South and Southeast Asia")),
    ("Plumeria rubra", "Apocynaceae", "Frangipani", None, Some("Mexico, Central America")),
    ("Spathodea campanulata", "Bignoniaceae", "African tulip tree", None, Some("Tropical Africa")),
    ("Tabebuia rosea", "Bignoniaceae", "Pink trumpet tree", None, Some("Central and South America")),
    ("Millingtonia hortensis", "Bignoniaceae", "Indian cork tree", None, Some("Southeast Asia")),
    ("Bauhinia variegata", "Fabaceae", "Orchid tree", None, Some("China, Indian subcontinent")),
    ("Pterocarpus santalinus", "Fabaceae", "Red sanders", Some("രക്തചന്ദനം"), Some("Eastern Ghats")),
    ("Pterocarpus marsupium", "Fabaceae", "Indian kino tree", None, Some("India, Nepal, Sri Lanka")),
    ("Santalum album", "Santalaceae", "Indian sandalwood", Some("ചന്ദനം"), Some("India, Southeast Asia")),
    ("Syzygium cumini", "Myrtaceae", "Java plum", Some("ഞാവൽ"), Some("Indian subcontinent, Southeast Asia")),
    ("Psidium guajava", "Myrtaceae", "Guava", Some("പേര"), Some("Tropical America")),
    ("Anacardium occidentale", "Anacardiaceae", "Cashew", Some("കശുമാവ്"), Some("Northeastern Brazil")),
    ("Artocarpus hirsutus", "Moraceae", "Wild jack", Some("ആഞ്ഞിലി"), Some("Western Ghats")),
    ("Artocarpus altilis", "Moraceae", "Breadfruit", None, Some("New Guinea, Pacific")),
    ("Ficus racemosa", "Moraceae", "Cluster fig", Some("അത്തി"), Some("Indian subcontinent, Australia")),
    ("Ficus microcarpa", "Moraceae", "Chinese banyan", None, Some("Tropical Asia, Australia")),
    ("Ficus elastica", "Moraceae", "Rubber fig", None, Some("Northeast India, Southeast Asia")),
    ("Hevea brasiliensis", "Euphorbiaceae", "Para rubber tree", Some("റബ്ബർ"), Some("Amazon basin")),
    ("Phyllanthus emblica", "Phyllanthaceae", "Indian gooseberry", Some("നെല്ലി"), Some("Tropical Asia")),
    ("Aegle marmelos", "Rutaceae", "Bael", Some("കൂവളം"), Some("Indian subcontinent")),
    ("Murraya koenigii", "Rutaceae", "Curry tree", Some("കറിവേപ്പ്"), Some("India, Sri Lanka")),
    ("Moringa oleifera", "Moringaceae", "Drumstick tree", Some("മുരിങ്ങ"), Some("Northern India")),
    ("Saraca asoca", "Fabaceae", "Ashoka tree", Some("അശോകം"), Some("Indian subcontinent")),
    ("Mimusops elengi", "Sapotaceae", "Spanish cherry", Some("ഇലഞ്ഞി"), Some("South and Southeast Asia")),
    ("Manilkara zapota", "Sapotaceae", "Sapodilla", None, Some("Mexico, Central America")),
    ("Madhuca longifolia", "Sapotaceae", "Mahua", None, Some("Indian subcontinent")),
    ("Calophyllum inophyllum", "Calophyllaceae", "Alexandrian laurel", Some("പുന്ന"), Some("East Africa to Pacific")),
    ("Garcinia gummi-gutta", "Clusiaceae", "Malabar tamarind", Some("കുടംപുളി"), Some("Western Ghats, Sri Lanka")),
    ("Mesua ferrea", "Calophyllaceae", "Ceylon ironwood", None, Some("South and Southeast Asia")),
    ("Careya arborea", "Lecythidaceae", "Wild guava", None, Some("South and Southeast Asia")),
    ("Couroupita guianensis", "Lecythidaceae", "Cannonball tree", None, Some("Northern South America")),
    ("Lagerstroemia speciosa", "Lythraceae", "Pride of India", None, Some("Tropical Southeast Asia")),
    ("Terminalia arjuna", "Combretaceae", "Arjun tree", None, Some("Indian subcontinent")),
    ("Terminalia bellirica", "Combretaceae", "Bahera", None, Some("South and Southeast Asia")),
    ("Terminalia chebula", "Combretaceae", "Chebulic myrobalan", None, Some("South and Southeast Asia")),
    ("Bombax ceiba", "Malvaceae", "Red silk-cotton tree", None, Some("Tropical Asia, Australia")),
    ("Ceiba pentandra", "Malvaceae", "Kapok", None, Some("Tropical America, West Africa")),
    ("Thespesia populnea", "Malvaceae", "Portia tree", None, Some("Pantropical coasts")),
    ("Sterculia foetida", "Malvaceae", "Wild almond", None, Some("East Africa to Australia")),
    ("Adenanthera pavonina", "Fabaceae", "Red bead tree", None, Some("India, Southeast Asia")),
    ("Albizia lebbeck", "Fabaceae", "Siris", None, Some("Indomalaya, New Guinea")),
    ("Erythrina variegata", "Fabaceae", "Indian coral tree", None, Some("East Africa to Pacific")),
    ("Butea monosperma", "Fabaceae", "Flame of the forest", None, Some("Indian subcontinent, Southeast Asia")),
    ("Dalbergia latifolia", "Fabaceae", "Indian rosewood", Some("ഈട്ടി"), Some("Indian subcontinent")),
    ("Gmelina arborea", "Lamiaceae", "White teak", None, Some("South and Southeast Asia")),
    ("Melia azedarach", "Meliaceae", "Chinaberry", None, Some("Indomalaya, Australasia")),
    ("Toona ciliata", "Meliaceae", "Red cedar", None, Some("South Asia to Australia")),
    ("Averrhoa bilimbi", "Oxalidaceae", "Bilimbi", Some("ഇരുമ്പൻപുളി"), Some("Moluccas")),
    ("Averrhoa carambola", "Oxalidaceae", "Star fruit", None, Some("Southeast Asia")),
    ("Muntingia calabura", "Muntingiaceae", "Jamaican cherry", None, Some("Tropical America")),
    ("Annona squamosa", "Annonaceae", "Sugar apple", None, Some("Tropical America")),
    ("Areca catechu", "Arecaceae", "Areca palm", Some("കമുക്"), Some("Philippines")),
    ("Borassus flabellifer", "Arecaceae", "Palmyra palm", Some("പന"), Some("South and Southeast Asia")),
];

/// Rows for the predefined species batch, in insertion order.
pub fn predefined_rows() -> Vec<NewTreeRow> {
    PREDEFINED_SPECIES
        .iter()
        .map(
            |(scientific_name, family, english, malayalam, native_range)| NewTreeRow {
                scientific_name: scientific_name.to_string(),
                family: family.to_string(),
                common_name_english: english.to_string(),
                common_name_malayalam: malayalam.map(str::to_string),
                native_range: native_range.map(str::to_string),
                location: DEFAULT_LOCATION.to_string(),
                description: None,
                image_url: None,
            },
        )
        .collect()
}
