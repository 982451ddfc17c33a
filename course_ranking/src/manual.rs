/*!

This is the long-form manual for `course_ranking` and `course-report`.

## Input formats

The following formats are supported:
* `xlsx` Excel workbook, as exported by the survey tool
* `csv` Comma Separated Values

In both cases the file is expected to look like the export of the exit survey:

| row | content                                                                 |
|-----|-------------------------------------------------------------------------|
| 1   | short question labels (ignored)                                          |
| 2   | full question text, used as column names                                 |
| 3   | field identifiers, for example `{"ImportId":"QID124_3"}` (not a response) |
| 4.. | one row per respondent                                                   |

The position of the header row can be changed with `headerRowIndex` (0-based, default 1).
The row right below the header is always dropped.

### `xlsx`

The first worksheet is read, unless `excelWorksheetName` is provided.

### `csv`

Rows may have different lengths. Missing cells are empty answers.

## Columns

Two groups of columns are aggregated:

- core courses: the column name contains
  `Please place each MAcc CORE course into rank order`. The answers are ranks,
  lower is better.
- elective courses: the column name contains both `Rate ` and
  `on a scale from 1-5`. The answers are ratings, higher is better.

The course name is the text after the last ` - ` in the column name.

Any answer that is not a number is ignored. A course without any numeric answer
gets an undefined mean, and is placed at the end of its group (see `undefinedMeans`).

Matching on the question text breaks as soon as the wording of a question changes.
The columns can instead be pinned by field identifier:

```json
{
  "rules": {
    "core": {
      "contains": ["Please place each MAcc CORE course into rank order"],
      "fieldMappings": [{"fieldId": "QID124_1", "course": "ACC 610"}]
    }
  }
}
```

A column whose field identifier is mapped is classified by the mapping, whatever its name.

## Configuration

`course-report` runs without any configuration. It reads
`Grad Program Exit Survey Data 2024.xlsx` and writes to `public`.
A JSON configuration file can be passed with `--config`:

```json
{
  "inputSettings": {
    "filePath": "Grad Program Exit Survey Data 2024.xlsx",
    "provider": "xlsx",
    "headerRowIndex": 1,
    "excelWorksheetName": "Sheet1"
  },
  "outputSettings": {
    "outputDirectory": "public",
    "title": "MAcc Program Course Rankings 2024",
    "createDirectory": true,
    "overwrite": true,
    "writeDataFiles": true
  },
  "rules": {
    "courseNameSeparator": " - ",
    "undefinedMeans": "last"
  }
}
```

All the keys are optional. Paths are relative to the configuration file.
Command line options take precedence over the configuration file.

## Output

The output directory contains:
- `core_courses_ranking.csv`: `Course,Mean Rank,Rank`
- `elective_courses_rating.csv`: `Course,Mean Rating,Rank`
- `core_chart.html`, `elective_chart.html`: the charts as standalone pages
- `index.html`: both charts, both tables and links to the files above

Existing files are replaced, unless `overwrite` is `false`.

 */
